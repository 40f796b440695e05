use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;

use crate::item::ListItem;

pub const ITEM_HEIGHT: u16 = 2;
pub const ITEM_SPACING: u16 = 1;
// title, status, gap, pagination, help
pub const CHROME_ROWS: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub horizontal: u16,
    pub vertical: u16,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            horizontal: 2,
            vertical: 1,
        }
    }
}

impl Margins {
    pub fn new(horizontal: u16, vertical: u16) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn frame_size(&self) -> (u16, u16) {
        (
            self.horizontal.saturating_mul(2),
            self.vertical.saturating_mul(2),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Launch(String),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterState {
    #[default]
    Unfiltered,
    Filtering,
    Applied,
}

#[derive(Debug, Clone)]
pub struct BrowserModel {
    items: Vec<ListItem>,
    visible: Vec<usize>,
    selected: usize,
    viewport_width: u16,
    viewport_height: u16,
    filter_text: String,
    filter_state: FilterState,
    margins: Margins,
    show_full_help: bool,
}

impl BrowserModel {
    pub fn new(items: Vec<ListItem>, margins: Margins) -> Self {
        let visible = (0..items.len()).collect();
        Self {
            items,
            visible,
            selected: 0,
            viewport_width: 0,
            viewport_height: 0,
            filter_text: String::new(),
            filter_state: FilterState::Unfiltered,
            margins,
            show_full_help: false,
        }
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &ListItem> + '_ {
        self.visible.iter().map(move |&index| &self.items[index])
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&ListItem> {
        self.visible
            .get(self.selected)
            .and_then(|&index| self.items.get(index))
    }

    pub fn viewport(&self) -> (u16, u16) {
        (self.viewport_width, self.viewport_height)
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter_state
    }

    pub fn is_filtering(&self) -> bool {
        self.filter_state == FilterState::Filtering
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn show_full_help(&self) -> bool {
        self.show_full_help
    }

    pub fn list_height(&self) -> u16 {
        self.viewport_height.saturating_sub(CHROME_ROWS)
    }

    pub fn items_per_page(&self) -> usize {
        let per_page = (self.list_height() + ITEM_SPACING) / (ITEM_HEIGHT + ITEM_SPACING);
        usize::from(per_page.max(1))
    }

    pub fn page(&self) -> usize {
        self.selected / self.items_per_page()
    }

    pub fn total_pages(&self) -> usize {
        self.visible.len().div_ceil(self.items_per_page()).max(1)
    }

    pub fn page_bounds(&self) -> (usize, usize) {
        let per_page = self.items_per_page();
        let start = (self.page() * per_page).min(self.visible.len());
        let end = (start + per_page).min(self.visible.len());
        (start, end)
    }

    pub fn update(&mut self, event: Event) -> Option<Effect> {
        match event {
            Event::Quit => Some(Effect::Quit),
            Event::Resize(width, height) => {
                self.resize(width, height);
                None
            }
            Event::Key(key) => self.handle_key(key),
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        let (h, v) = self.margins.frame_size();
        self.viewport_width = width.saturating_sub(h);
        self.viewport_height = height.saturating_sub(v);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Effect> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Effect::Quit);
        }

        match self.filter_state {
            FilterState::Filtering => {
                self.handle_filter_key(key);
                None
            }
            FilterState::Unfiltered | FilterState::Applied => self.handle_browse_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Option<Effect> {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }

        let page = self.items_per_page() as isize;
        match key.code {
            KeyCode::Enter => {
                return self
                    .selected_item()
                    .map(|item| Effect::Launch(item.description.clone()));
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp
            | KeyCode::Left
            | KeyCode::Char('h')
            | KeyCode::Char('b')
            | KeyCode::Char('u') => self.move_selection(-page),
            KeyCode::PageDown
            | KeyCode::Right
            | KeyCode::Char('l')
            | KeyCode::Char('f')
            | KeyCode::Char('d') => self.move_selection(page),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = self.visible.len().saturating_sub(1);
            }
            KeyCode::Char('/') => {
                debug!("filter input focused");
                self.filter_state = FilterState::Filtering;
            }
            KeyCode::Char('?') => self.show_full_help = !self.show_full_help,
            KeyCode::Char('q') => return Some(Effect::Quit),
            KeyCode::Esc => {
                if self.filter_state == FilterState::Applied {
                    self.reset_filter();
                } else {
                    return Some(Effect::Quit);
                }
            }
            _ => {}
        }
        None
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.reset_filter(),
            KeyCode::Enter | KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.filter_state = if self.filter_text.is_empty() {
                    FilterState::Unfiltered
                } else {
                    FilterState::Applied
                };
                debug!(
                    "filter accepted: {:?} matches {} of {}",
                    self.filter_text,
                    self.visible.len(),
                    self.items.len()
                );
            }
            KeyCode::Backspace => {
                if self.filter_text.pop().is_some() {
                    self.apply_filter();
                }
            }
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.filter_text.push(ch);
                self.apply_filter();
            }
            _ => {}
        }
    }

    pub fn set_filter(&mut self, text: &str) {
        self.filter_text = text.to_string();
        self.apply_filter();
    }

    fn reset_filter(&mut self) {
        self.filter_text.clear();
        self.filter_state = FilterState::Unfiltered;
        self.apply_filter();
        debug!("filter cleared");
    }

    fn apply_filter(&mut self) {
        let needle = self.filter_text.to_lowercase();
        let visible: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.filter_value().to_lowercase().contains(&needle))
            .map(|(index, _)| index)
            .collect();

        if visible != self.visible {
            self.visible = visible;
            self.selected = 0;
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.visible.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.visible.len() as isize - 1;
        let next = (self.selected as isize + delta).clamp(0, last);
        self.selected = next as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(ch: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
    }

    fn items(titles: &[&str]) -> Vec<ListItem> {
        titles
            .iter()
            .enumerate()
            .map(|(idx, title)| ListItem::new(*title, format!("http://example.com/{idx}")))
            .collect()
    }

    fn model(titles: &[&str]) -> BrowserModel {
        let mut model = BrowserModel::new(items(titles), Margins::default());
        model.update(Event::Resize(80, 24));
        model
    }

    fn type_text(model: &mut BrowserModel, text: &str) {
        for ch in text.chars() {
            model.update(key(KeyCode::Char(ch)));
        }
    }

    fn visible_titles(model: &BrowserModel) -> Vec<String> {
        model.visible_items().map(|item| item.title.clone()).collect()
    }

    fn assert_in_bounds(model: &BrowserModel) {
        if model.visible_len() == 0 {
            assert_eq!(model.selected_index(), 0);
            assert!(model.selected_item().is_none());
        } else {
            assert!(model.selected_index() < model.visible_len());
        }
    }

    #[test]
    fn starts_browsing_with_everything_visible() {
        let model = BrowserModel::new(items(&["A", "B"]), Margins::default());
        assert_eq!(model.filter_state(), FilterState::Unfiltered);
        assert_eq!(model.visible_len(), 2);
        assert_eq!(model.selected_index(), 0);
        assert_eq!(model.viewport(), (0, 0));
    }

    #[test]
    fn enter_launches_selected_link() {
        let mut model = model(&["A", "B"]);
        assert_eq!(
            model.update(key(KeyCode::Enter)),
            Some(Effect::Launch("http://example.com/0".into()))
        );
        model.update(key(KeyCode::Down));
        assert_eq!(
            model.update(key(KeyCode::Enter)),
            Some(Effect::Launch("http://example.com/1".into()))
        );
        assert_eq!(model.selected_index(), 1);
    }

    #[test]
    fn ctrl_c_quits_in_every_state() {
        let mut model = model(&["A"]);
        assert_eq!(model.update(ctrl('c')), Some(Effect::Quit));
        model.update(key(KeyCode::Char('/')));
        assert!(model.is_filtering());
        assert_eq!(model.update(ctrl('c')), Some(Effect::Quit));
        assert_eq!(model.update(Event::Quit), Some(Effect::Quit));
    }

    #[test]
    fn q_and_esc_quit_only_while_browsing() {
        let mut model = model(&["A"]);
        assert_eq!(model.update(key(KeyCode::Char('q'))), Some(Effect::Quit));
        assert_eq!(model.update(key(KeyCode::Esc)), Some(Effect::Quit));

        model.update(key(KeyCode::Char('/')));
        assert_eq!(model.update(key(KeyCode::Char('q'))), None);
        assert_eq!(model.filter_text(), "q");
    }

    #[test]
    fn empty_list_never_selects() {
        let mut model = model(&[]);
        assert_eq!(model.update(key(KeyCode::Enter)), None);
        for code in [KeyCode::Down, KeyCode::End, KeyCode::PageDown, KeyCode::Up] {
            model.update(key(code));
            assert_in_bounds(&model);
        }
        assert_eq!(model.total_pages(), 1);
        assert_eq!(model.page_bounds(), (0, 0));
    }

    #[test]
    fn navigation_clamps_without_wrapping() {
        let mut model = model(&["A", "B", "C"]);
        model.update(key(KeyCode::Up));
        assert_eq!(model.selected_index(), 0);
        for _ in 0..10 {
            model.update(key(KeyCode::Char('j')));
        }
        assert_eq!(model.selected_index(), 2);
        model.update(key(KeyCode::Home));
        assert_eq!(model.selected_index(), 0);
        model.update(key(KeyCode::Char('G')));
        assert_eq!(model.selected_index(), 2);
        model.update(key(KeyCode::Char('g')));
        assert_eq!(model.selected_index(), 0);
    }

    #[test]
    fn navigation_sequences_stay_in_bounds() {
        let titles: Vec<String> = (0..23).map(|i| format!("post {i}")).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let codes = [
            KeyCode::Down,
            KeyCode::PageDown,
            KeyCode::Up,
            KeyCode::End,
            KeyCode::PageUp,
            KeyCode::Char('l'),
            KeyCode::Char('h'),
            KeyCode::Home,
            KeyCode::Char('f'),
            KeyCode::Char('b'),
        ];
        for height in [0u16, 3, 8, 24, 60] {
            let mut model = BrowserModel::new(items(&refs), Margins::default());
            model.update(Event::Resize(40, height));
            for step in 0..200usize {
                let code = codes[(step * 7 + usize::from(height)) % codes.len()];
                model.update(key(code));
                assert_in_bounds(&model);
                let (start, end) = model.page_bounds();
                assert!(start <= model.selected_index() && model.selected_index() < end);
            }
        }
    }

    #[test]
    fn paging_moves_by_items_per_page() {
        let titles: Vec<String> = (0..30).map(|i| format!("post {i}")).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let mut model = model(&refs);
        // 24 rows - 2 margin - 5 chrome = 17 list rows, 3 rows per item.
        assert_eq!(model.items_per_page(), 6);
        model.update(key(KeyCode::PageDown));
        assert_eq!(model.selected_index(), 6);
        assert_eq!(model.page(), 1);
        model.update(key(KeyCode::PageUp));
        model.update(key(KeyCode::PageUp));
        assert_eq!(model.selected_index(), 0);
        assert_eq!(model.total_pages(), 5);
    }

    #[test]
    fn resize_subtracts_margins_and_saturates() {
        let mut model = BrowserModel::new(items(&["A"]), Margins::new(2, 1));
        model.update(Event::Resize(100, 30));
        assert_eq!(model.viewport(), (96, 28));
        model.update(Event::Resize(3, 1));
        assert_eq!(model.viewport(), (0, 0));
        for (w, h) in [(0u16, 0u16), (4, 2), (5, 3), (u16::MAX, u16::MAX)] {
            model.update(Event::Resize(w, h));
            assert_eq!(model.viewport(), (w.saturating_sub(4), h.saturating_sub(2)));
        }
    }

    #[test]
    fn filtering_is_case_insensitive_substring() {
        let mut model = model(&["Rust news", "Go weekly", "trusty tools", "Python"]);
        model.update(key(KeyCode::Down));
        model.update(key(KeyCode::Char('/')));
        type_text(&mut model, "RUST");
        assert_eq!(visible_titles(&model), vec!["Rust news", "trusty tools"]);
        assert_eq!(model.selected_index(), 0);
    }

    #[test]
    fn filter_idempotent() {
        let mut model = model(&["alpha", "beta", "alphabet"]);
        model.set_filter("alp");
        let once = visible_titles(&model);
        model.update(key(KeyCode::Down));
        model.set_filter("alp");
        assert_eq!(visible_titles(&model), once);
        // Same composition, so the cursor is left alone.
        assert_eq!(model.selected_index(), 1);
    }

    #[test]
    fn accept_and_clear_filter() {
        let mut model = model(&["alpha", "beta"]);
        model.update(key(KeyCode::Char('/')));
        type_text(&mut model, "bet");
        // Enter accepts the filter instead of launching.
        assert_eq!(model.update(key(KeyCode::Enter)), None);
        assert_eq!(model.filter_state(), FilterState::Applied);
        assert_eq!(visible_titles(&model), vec!["beta"]);
        assert_eq!(
            model.update(key(KeyCode::Enter)),
            Some(Effect::Launch("http://example.com/1".into()))
        );

        assert_eq!(model.update(key(KeyCode::Esc)), None);
        assert_eq!(model.filter_state(), FilterState::Unfiltered);
        assert_eq!(model.filter_text(), "");
        assert_eq!(model.visible_len(), 2);
    }

    #[test]
    fn accepting_empty_filter_returns_to_unfiltered() {
        let mut model = model(&["alpha"]);
        model.update(key(KeyCode::Char('/')));
        model.update(key(KeyCode::Tab));
        assert_eq!(model.filter_state(), FilterState::Unfiltered);
    }

    #[test]
    fn esc_cancels_filtering() {
        let mut model = model(&["alpha", "beta"]);
        model.update(key(KeyCode::Char('/')));
        type_text(&mut model, "zzz");
        assert_eq!(model.visible_len(), 0);
        assert_in_bounds(&model);
        assert_eq!(model.update(key(KeyCode::Esc)), None);
        assert_eq!(model.filter_state(), FilterState::Unfiltered);
        assert_eq!(model.visible_len(), 2);
    }

    #[test]
    fn backspace_widens_the_filter() {
        let mut model = model(&["alpha", "alps", "beta"]);
        model.update(key(KeyCode::Char('/')));
        type_text(&mut model, "alph");
        assert_eq!(model.visible_len(), 1);
        model.update(key(KeyCode::Backspace));
        assert_eq!(model.filter_text(), "alp");
        assert_eq!(model.visible_len(), 2);
        model.update(key(KeyCode::Backspace));
        model.update(key(KeyCode::Backspace));
        model.update(key(KeyCode::Backspace));
        model.update(key(KeyCode::Backspace));
        assert_eq!(model.filter_text(), "");
        assert_eq!(model.visible_len(), 3);
    }

    #[test]
    fn selection_resets_when_visible_set_changes() {
        let mut model = model(&["alpha", "beta", "gamma"]);
        model.update(key(KeyCode::End));
        assert_eq!(model.selected_index(), 2);
        model.update(key(KeyCode::Char('/')));
        type_text(&mut model, "a");
        // every title contains "a": composition unchanged
        assert_eq!(model.selected_index(), 2);
        type_text(&mut model, "l");
        assert_eq!(model.selected_index(), 0);
        assert_eq!(visible_titles(&model), vec!["alpha"]);
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut model = model(&["A", "B"]);
        let before = (model.selected_index(), model.filter_state());
        assert_eq!(model.update(key(KeyCode::F(5))), None);
        assert_eq!(model.update(key(KeyCode::Char('x'))), None);
        assert_eq!(model.update(ctrl('d')), None);
        assert_eq!((model.selected_index(), model.filter_state()), before);
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut model = model(&["A", "B"]);
        let release = KeyEvent {
            code: KeyCode::Down,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(model.update(Event::Key(release)), None);
        assert_eq!(model.selected_index(), 0);
    }

    #[test]
    fn question_mark_toggles_help() {
        let mut model = model(&["A"]);
        model.update(key(KeyCode::Char('?')));
        assert!(model.show_full_help());
        model.update(key(KeyCode::Char('?')));
        assert!(!model.show_full_help());
    }
}
