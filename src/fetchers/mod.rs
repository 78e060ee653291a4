mod browser;
mod launcher;
mod pack;
mod request;

pub use browser::{BrowserRenderer, PageRenderer, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
pub use launcher::{launcher_for, BrowserLauncher, BrowserSession, ConstrainedLauncher, FullLauncher};
pub use pack::PinnedBrowserPack;
pub use request::{ProbeReport, RequestFetcher};
