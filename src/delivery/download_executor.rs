use chrono::Utc;
use reqwest::blocking::Client;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use url::Url;

use super::DownloadTrigger;
use crate::config::ClientConfig;

/*
 * The FileDownloader saves a delivered file into the download directory on its own thread
 *
 * - the session only starts the transfer, it never hears back
 * - the body streams into a temp file next to the target, only a complete file gets a real name
 * - every finished thread sends its outcome on a channel so the cli can wait before exiting
*/

pub type DownloadOutcome = Result<PathBuf, String>;

// how many numbered names to try after the time stamped one is taken
const MAX_NAME_ATTEMPTS: usize = 1000;

#[derive(Debug)]
pub struct FileDownloader {
    client: Client,
    download_dir: PathBuf,
    done_tx: Mutex<Sender<DownloadOutcome>>,
    done_rx: Mutex<Receiver<DownloadOutcome>>,
    in_flight: AtomicUsize,
}

impl FileDownloader {
    pub fn new(client: Client, download_dir: PathBuf) -> Self {
        let (done_tx, done_rx) = mpsc::channel();
        Self {
            client,
            download_dir,
            done_tx: Mutex::new(done_tx),
            done_rx: Mutex::new(done_rx),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Transfers are never cut off by a timeout, however long a file takes.
    /// `--timeout-secs` only bounds the conversion request.
    pub fn from_config(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(None).build()?;
        Ok(Self::new(client, config.download_dir.clone()))
    }

    /// Blocks until every started transfer has finished and returns their outcomes.
    pub fn wait_all(&self) -> Vec<DownloadOutcome> {
        let rx = self.done_rx.lock().unwrap_or_else(|e| e.into_inner());
        let mut outcomes = vec![];
        while self.in_flight.load(Ordering::SeqCst) > 0 {
            match rx.recv() {
                Ok(outcome) => {
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                    outcomes.push(outcome);
                }
                Err(_) => break,
            }
        }
        outcomes
    }

    // download the file and store it, returns where it ended up
    fn download_the_file(
        client: &Client,
        location: Url,
        download_path: &Path,
        file_name: &str,
    ) -> DownloadOutcome {
        let mut resp = client
            .get(location)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| e.to_string())?;

        std::fs::create_dir_all(download_path).map_err(|e| e.to_string())?;

        // dropping the temp file on any error below removes the partial data
        let mut part = NamedTempFile::new_in(download_path).map_err(|e| e.to_string())?;
        resp.copy_to(&mut part).map_err(|e| e.to_string())?;

        safely_persist(part, download_path, file_name).map_err(|e| e.to_string())
    }
}

impl DownloadTrigger for FileDownloader {
    fn initiate_download(&self, location: &Url, suggested_name: &str) {
        let client = self.client.clone();
        let location = location.clone();
        let download_path = self.download_dir.clone();
        let file_name = sanitize_file_name(suggested_name);
        let done_tx = self
            .done_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        debug!(%location, %file_name, "starting file transfer");

        thread::spawn(move || {
            let outcome = Self::download_the_file(&client, location, &download_path, &file_name);
            match &outcome {
                Ok(path) => info!("saved {}", path.display()),
                Err(e) => warn!("file transfer for {} failed: {}", file_name, e),
            }

            // the receiver may already be gone, nobody is waiting then
            let _ = done_tx.send(outcome);
        });
    }
}

// path separators in a title would escape the download directory
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        String::from("download")
    } else {
        cleaned
    }
}

// the plain name first, then a time stamp, then the time stamp with a counter
fn candidate_name(file_name: &str, stamp: &str, attempt: usize) -> String {
    let suffix = match attempt {
        0 => return file_name.to_owned(),
        1 => stamp.to_owned(),
        n => format!("{}_{}", stamp, n - 1),
    };

    match file_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => format!("{}_{}.{}", stem, suffix, extension),
        _ => format!("{}_{}", file_name, suffix),
    }
}

// gives the finished temp file its final name without ever replacing an existing file
fn safely_persist(
    part: NamedTempFile,
    download_path: &Path,
    file_name: &str,
) -> io::Result<PathBuf> {
    let stamp = Utc::now().format("%Y_%b_%d_%H_%M_%S").to_string();
    let mut part = part;

    for attempt in 0..=MAX_NAME_ATTEMPTS {
        let path = download_path.join(candidate_name(file_name, &stamp, attempt));
        match part.persist_noclobber(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => part = e.file,
            Err(e) => return Err(e.error),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name left for {}", file_name),
    ))
}
