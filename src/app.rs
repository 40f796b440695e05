use std::io::{self, Stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::event::{self, Event as TermEvent};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::{info, warn};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;

use crate::config;
use crate::feed;
use crate::item;
use crate::launcher::{Launch, SystemLauncher};
use crate::logging;
use crate::model::{BrowserModel, Effect, Event, Margins};
use crate::render::Renderer;

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub config_file: Option<PathBuf>,
    pub feed_url: Option<String>,
}

pub fn run(options: Options) -> Result<()> {
    let cfg = config::load(config::LoadOptions {
        config_file: options.config_file.clone(),
        env_prefix: None,
    })
    .context("load config")?;
    logging::init(&cfg.log);

    let url = options.feed_url.unwrap_or_else(|| cfg.feed.url.clone());
    info!(
        "argot {} starting: feed={url} timeout={:?}",
        crate::VERSION,
        cfg.feed.timeout
    );

    let client = feed::Client::new(feed::ClientConfig {
        user_agent: cfg.feed.user_agent.clone(),
        timeout: Some(cfg.feed.timeout),
        http_client: None,
    })
    .context("build feed client")?;
    let posts = client
        .fetch(&url)
        .with_context(|| format!("fetch feed from {url}"))?;

    let margins = Margins::new(cfg.ui.margin_horizontal, cfg.ui.margin_vertical);
    let mut model = BrowserModel::new(item::adapt(&posts), margins);
    let renderer = Renderer::new(margins, cfg.ui.title.clone());
    let launcher = SystemLauncher::new(cfg.launcher.command.clone());

    let mut terminal = enter_terminal().context("enter alternate screen")?;
    let result = crossterm::terminal::size()
        .context("read terminal size")
        .and_then(|(width, height)| {
            model.update(Event::Resize(width, height));
            event_loop(&mut terminal, &mut model, &renderer, &launcher, next_event)
        });
    let restored = leave_terminal(&mut terminal).context("restore terminal");

    match (result, restored) {
        (Err(err), restored) => {
            if let Err(restore_err) = restored {
                warn!("{restore_err:#}");
            }
            Err(err)
        }
        (Ok(()), restored) => {
            info!("quit");
            restored
        }
    }
}

fn enter_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    match open_alternate_screen() {
        Ok(terminal) => Ok(terminal),
        Err(err) => {
            let _ = io::stdout().execute(LeaveAlternateScreen);
            let _ = disable_raw_mode();
            Err(err)
        }
    }
}

fn open_alternate_screen() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

// Every step runs even if an earlier one fails; the first error is returned.
fn leave_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let raw = disable_raw_mode().context("disable raw mode");
    let screen = terminal
        .backend_mut()
        .execute(LeaveAlternateScreen)
        .map(|_| ())
        .context("leave alternate screen");
    let cursor = terminal.show_cursor().context("show cursor");
    first_error([raw, screen, cursor])
}

fn first_error<const N: usize>(steps: [Result<()>; N]) -> Result<()> {
    steps.into_iter().collect()
}

fn next_event() -> Result<Option<Event>> {
    let event = event::read().context("read terminal event")?;
    Ok(match event {
        TermEvent::Key(key) => Some(Event::Key(key)),
        TermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    })
}

pub fn event_loop<B, F>(
    terminal: &mut Terminal<B>,
    model: &mut BrowserModel,
    renderer: &Renderer,
    launcher: &dyn Launch,
    mut next_event: F,
) -> Result<()>
where
    B: Backend,
    F: FnMut() -> Result<Option<Event>>,
{
    terminal
        .draw(|frame| renderer.draw(frame, model))
        .context("draw frame")?;

    loop {
        let Some(event) = next_event()? else {
            continue;
        };

        match model.update(event) {
            Some(Effect::Quit) => break,
            Some(Effect::Launch(target)) => launcher.open(&target),
            None => {}
        }

        terminal
            .draw(|frame| renderer.draw(frame, model))
            .context("draw frame")?;
    }

    Ok(())
}
