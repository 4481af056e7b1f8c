//! Read-only views derived from freshly fetched news, comments and users.
pub mod activity;
pub mod popular;
pub mod stats;

pub use activity::{activity_feed, ActivityEntry, ActivityKind};
pub use popular::{popular_posts, recent_posts, PopularPost};
pub use stats::Stats;

use crate::api::client::ApiClient;
use crate::api::resource::ResourceClient;
use crate::error::ApiError;
use crate::models::{Comment, Comments, News, NewsArticles, User, Users};

/// Popular posts widget on the dashboard
pub const POPULAR_LIMIT: usize = 10;
/// Popular and recent lists on the posts tab
pub const POSTS_TAB_LIMIT: usize = 5;
/// Comments and activity entries added by each "load more"
pub const PAGE_SIZE: usize = 10;

/// One snapshot of the three collections the dashboard reads.
/// Nothing is cached: every load re-fetches and every view re-derives.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub news: Vec<News>,
    pub comments: Vec<Comment>,
    pub users: Vec<User>,
}

impl Dashboard {
    pub async fn load(api: &ApiClient) -> Result<Self, ApiError> {
        let news = ResourceClient::<NewsArticles>::new(api.clone());
        let comments = ResourceClient::<Comments>::new(api.clone());
        let users = ResourceClient::<Users>::new(api.clone());

        let (news, comments, users) = futures::try_join!(news.fetch_all(), comments.fetch_all(), users.fetch_all())?;
        tracing::debug!(
            "Dashboard loaded: {} news, {} comments, {} users",
            news.len(),
            comments.len(),
            users.len()
        );

        Ok(Self { news, comments, users })
    }

    pub fn stats(&self) -> Stats {
        Stats::count(self.news.len(), self.users.len(), self.comments.len())
    }

    pub fn popular(&self, limit: usize) -> Vec<PopularPost> {
        popular_posts(&self.news, &self.comments, limit)
    }

    pub fn recent(&self, limit: usize) -> Vec<News> {
        recent_posts(&self.news, limit)
    }

    pub fn activity(&self) -> Vec<ActivityEntry> {
        activity_feed(&self.news, &self.comments, &self.users)
    }

    /// Comments in server order
    pub fn latest_comments(&self, limit: usize) -> &[Comment] {
        &self.comments[..limit.min(self.comments.len())]
    }

    /// Comments visible once `pages` pages of `page_size` have been loaded
    pub fn comments_page(&self, page_size: usize, pages: usize) -> &[Comment] {
        self.latest_comments(visible(page_size, pages))
    }

    /// Activity entries visible once `pages` pages of `page_size` have been loaded
    pub fn activity_page(&self, page_size: usize, pages: usize) -> Vec<ActivityEntry> {
        let mut feed = self.activity();
        feed.truncate(visible(page_size, pages));
        feed
    }

    /// Whether another "load more" would reveal anything
    pub fn has_more_comments(&self, page_size: usize, pages: usize) -> bool {
        self.comments.len() > visible(page_size, pages)
    }
}

/// The first page is always shown
fn visible(page_size: usize, pages: usize) -> usize {
    page_size.saturating_mul(pages.max(1))
}
