mod download_executor;
mod resolver;

pub use download_executor::{sanitize_file_name, DownloadOutcome, FileDownloader};
pub use resolver::{flatten, is_reversible, unflatten, DeliveryAction, DeliveryResolver};

use url::Url;

/// Platform capability that starts acquiring a file. Fire-and-forget: the
/// caller never learns whether the transfer completes.
pub trait DownloadTrigger {
    fn initiate_download(&self, location: &Url, suggested_name: &str);
}

impl<T: DownloadTrigger + ?Sized> DownloadTrigger for &T {
    fn initiate_download(&self, location: &Url, suggested_name: &str) {
        (**self).initiate_download(location, suggested_name)
    }
}
