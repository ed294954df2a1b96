use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Extract code blocks from the message
    #[clap(long)]
    pub code: bool,
    /// Include debug messages
    #[clap(long)]
    pub debug: bool,
    /// Create a new thread starting with this message
    #[clap(long)]
    pub new: bool,
    /// Print the last response again
    #[clap(long)]
    pub last: bool,
    /// The file to send to the assistant, if 'last' is provided, the last file will be used
    #[clap(long, value_name = "FILE")]
    pub file: Option<String>,
    /// Cache key for this shell session, defaults to the parent process id
    #[clap(long, value_name = "KEY")]
    pub session: Option<String>,
    /// The message to send to the assistant
    #[clap(value_name = "MESSAGE")]
    text: Vec<String>,
}

impl Cli {
    pub fn message(&self) -> String {
        self.text.join(" ")
    }
}
