use crate::feed::Post;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListItem {
    pub title: String,
    pub description: String,
}

impl ListItem {
    pub fn new<T: Into<String>, D: Into<String>>(title: T, description: D) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn filter_value(&self) -> &str {
        &self.title
    }
}

impl From<&Post> for ListItem {
    fn from(post: &Post) -> Self {
        Self::new(post.title.clone(), post.link.clone())
    }
}

pub fn adapt(posts: &[Post]) -> Vec<ListItem> {
    posts.iter().map(ListItem::from).collect()
}
