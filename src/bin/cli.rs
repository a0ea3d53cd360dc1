//! VaultKV CLI Client
//!
//! Command-line interface for interacting with VaultKV.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use vaultkv::protocol::{read_response, write_request, Command, Response};

/// Longest reply line the client accepts
const MAX_REPLY_SIZE: usize = 64 * 1024 * 1024;

/// VaultKV CLI
#[derive(Parser, Debug)]
#[command(name = "vaultkv-cli")]
#[command(about = "CLI for VaultKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:5381")]
    server: String,

    /// Command to run; omit for an interactive prompt
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Check whether a key exists
    Exists {
        /// The key to check
        key: String,
    },

    /// List all keys
    Keys,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Get { key } => Command::Get { key },
            Commands::Set { key, value } => Command::Set { key, value },
            Commands::Del { key } => Command::Del { key },
            Commands::Exists { key } => Command::Exists { key },
            Commands::Keys => Command::Keys,
        }
    }
}

struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    fn connect(addr: &str) -> vaultkv::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }

    fn send(&mut self, line: &str) -> vaultkv::Result<Option<Response>> {
        write_request(&mut self.writer, line)?;
        read_response(&mut self.reader, MAX_REPLY_SIZE)
    }
}

fn print_response(response: &Response) {
    match response {
        Response::Value(text) => println!("{}", text),
        Response::Error(_) => eprintln!("{}", response.to_line()),
    }
}

fn run_once(client: &mut Client, command: Command) -> ExitCode {
    match client.send(&command.to_line()) {
        Ok(Some(response)) => {
            print_response(&response);
            if response.is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Ok(None) => {
            eprintln!("server closed the connection");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_interactive(client: &mut Client) -> ExitCode {
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => return ExitCode::SUCCESS,
            Ok(_) => {}
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            return ExitCode::SUCCESS;
        }

        match client.send(line) {
            Ok(Some(response)) => print_response(&response),
            Ok(None) => {
                eprintln!("server closed the connection");
                return ExitCode::FAILURE;
            }
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("could not connect to {}: {}", args.server, e);
            return ExitCode::FAILURE;
        }
    };

    match args.command {
        Some(command) => run_once(&mut client, command.into()),
        None => run_interactive(&mut client),
    }
}
