use super::converter_commands::*;
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::debug;

use crate::client::{ConversionService, HttpConversionClient};
use crate::config::ClientConfig;
use crate::delivery::{DeliveryResolver, DownloadTrigger, FileDownloader};
use crate::model::{AudioFormat, ConversionOptions, Quality};
use crate::session::{Session, SessionState, SubmitOutcome};

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    about = "Converts video urls to audio files through a conversion service",
    name = "converter"
)]
pub struct Converter {
    /// Base address of the conversion service, e.g. http://localhost:8001
    #[structopt(short, long, env = "CONVERTER_BACKEND_URL")]
    pub backend_url: String,

    /// Give up on the service after this many seconds (0 waits forever)
    #[structopt(short, long, env = "CONVERTER_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Where converted files are saved
    #[structopt(
        short = "d",
        long,
        env = "CONVERTER_DOWNLOAD_DIR",
        default_value = ".",
        parse(from_os_str)
    )]
    pub download_dir: PathBuf,

    /// Log debug output to stderr
    #[structopt(short, long)]
    pub verbose: bool,

    #[structopt(subcommand)]
    pub subcommands: ConverterCommands,
}

impl Converter {
    pub fn config(&self) -> Result<ClientConfig> {
        let config = ClientConfig::new(
            &self.backend_url,
            self.timeout_secs,
            self.download_dir.clone(),
        )?;
        Ok(config)
    }

    pub fn handle(&self) -> Result<String> {
        match self.subcommands.clone() {
            ConverterCommands::Options => Ok(list_options()),
            ConverterCommands::Ping => {
                let client = HttpConversionClient::new(self.config()?)?;
                let banner = client.ping().context("conversion service did not answer")?;
                Ok(format!("{} is up: {}", client.config().base_url, banner))
            }
            ConverterCommands::Convert { url, format, quality } => {
                let (client, resolver, downloader) = self.build()?;
                let session = Session::new(client, resolver, &downloader);
                session.set_options(ConversionOptions { format, quality })?;

                let outcome = session.submit(&url);
                let mut lines = vec![session.message().unwrap_or_default()];
                if let SubmitOutcome::Ready(_) = outcome {
                    lines.extend(report_saved(&downloader));
                }
                Ok(lines.join("\n"))
            }
            ConverterCommands::Interactive { format, quality } => {
                let (client, resolver, downloader) = self.build()?;
                let session = Session::new(client, resolver, &downloader);
                session.set_options(ConversionOptions { format, quality })?;

                let stdin = io::stdin();
                let stdout = io::stdout();
                run_interactive(&session, stdin.lock(), stdout.lock())?;

                let saved = report_saved(&downloader);
                if saved.is_empty() {
                    Ok(String::from("Good Bye!"))
                } else {
                    Ok(saved.join("\n"))
                }
            }
        }
    }

    fn build(&self) -> Result<(HttpConversionClient, DeliveryResolver, FileDownloader)> {
        let config = self.config()?;
        debug!(?config, "building conversion client");

        let client = HttpConversionClient::new(config.clone())?;
        let resolver = DeliveryResolver::new(&config)?;
        let downloader = FileDownloader::from_config(&config)?;
        Ok((client, resolver, downloader))
    }
}

/// Waits for the file transfers so the process does not exit under them,
/// one line per transfer.
pub fn report_saved(downloader: &FileDownloader) -> Vec<String> {
    downloader
        .wait_all()
        .into_iter()
        .map(|outcome| match outcome {
            Ok(path) => format!("Saved to {}", path.display()),
            Err(e) => format!("Saving the file failed: {}", e),
        })
        .collect()
}

pub fn list_options() -> String {
    let mut out = String::from("Formats:\r\n");
    for format in AudioFormat::ALL.iter() {
        out.push_str(&format!("  {:<6} {}\r\n", format.extension(), format.label()));
    }
    out.push_str("Qualities:\r\n");
    for quality in Quality::ALL.iter() {
        out.push_str(&format!("  {:<6} {}\r\n", quality.name(), quality.label()));
    }
    out
}

const HELP: &str = "enter a url to convert, or: format <fmt>, quality <q>, reset, status, quit";

/// Line based front end for a session. Each non-command line is submitted as a url.
pub fn run_interactive<S, D, R, W>(session: &Session<S, D>, input: R, mut output: W) -> Result<()>
where
    S: ConversionService,
    D: DownloadTrigger,
    R: BufRead,
    W: Write,
{
    writeln!(output, "{}", HELP)?;

    for line in input.lines() {
        let line = line?;
        let (command, arg) = match line.trim().split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line.trim(), ""),
        };

        let reply = match command {
            "quit" | "exit" => break,
            "help" => HELP.to_string(),
            "format" => match arg.parse::<AudioFormat>() {
                Ok(format) => update_options(session, |options| options.format = format),
                Err(e) => e,
            },
            "quality" => match arg.parse::<Quality>() {
                Ok(quality) => update_options(session, |options| options.quality = quality),
                Err(e) => e,
            },
            "reset" => match session.reset() {
                Ok(()) => String::from("ready for the next url"),
                Err(e) => e.to_string(),
            },
            "status" => describe(session),
            _ => {
                session.submit(&line);
                session.message().unwrap_or_default()
            }
        };

        writeln!(output, "{}", reply)?;
    }

    Ok(())
}

fn update_options<S, D, F>(session: &Session<S, D>, change: F) -> String
where
    S: ConversionService,
    D: DownloadTrigger,
    F: FnOnce(&mut ConversionOptions),
{
    let mut options = session.options();
    change(&mut options);
    match session.set_options(options) {
        Ok(()) => format!("format {}, quality {}", options.format, options.quality),
        Err(e) => e.to_string(),
    }
}

fn describe<S, D>(session: &Session<S, D>) -> String
where
    S: ConversionService,
    D: DownloadTrigger,
{
    let options = session.options();
    let detail = match session.state() {
        SessionState::Ready { delivery, .. } => format!(" ({})", delivery.suggested_name),
        SessionState::Failed { message } => format!(" ({})", message),
        SessionState::Idle | SessionState::Submitting => String::new(),
    };
    format!(
        "{}{}, format {}, quality {}",
        session.state().name(),
        detail,
        options.format,
        options.quality
    )
}
