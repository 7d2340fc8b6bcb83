use structopt::StructOpt;

use crate::model::{AudioFormat, Quality};

#[derive(StructOpt, Debug, Clone)]
pub enum ConverterCommands {
    /// Convert one video url to an audio file and save it in the download directory
    Convert {
        #[structopt(short, long)]
        url: String,
        /// mp3, wav, m4a, flac or ogg
        #[structopt(short, long, default_value = "mp3")]
        format: AudioFormat,
        /// high, medium or low
        #[structopt(short, long, default_value = "high")]
        quality: Quality,
    },
    /// Read urls from stdin and convert them one after another
    Interactive {
        #[structopt(short, long, default_value = "mp3")]
        format: AudioFormat,
        #[structopt(short, long, default_value = "high")]
        quality: Quality,
    },
    /// List the available formats and qualities
    Options,
    /// Check that the conversion service answers
    Ping,
}
