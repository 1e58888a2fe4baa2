//! Chatroom terminal client
//!
//! Connects to a chat server, negotiates a username and then runs a receive
//! task and a send task side by side until the user quits or the server
//! closes the connection.
//!
//! Usage: `chatroom-client [address]`. Without an address the client dials
//! the server described by `chatroom.toml` / `CHATROOM_*` on this host.

use std::io::Write;
use std::net::SocketAddr;

use log::warn;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::watch;

use chatroom::ServerConfig;
use chatroom::protocol::responses;
use chatroom::protocol::validation::{is_valid_name, strip_line_ending};
use chatroom::utils::logging::setup_logging;
use chatroom::utils::network::{connect_addr, parse_socket_addr};

type StdinLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() {
    setup_logging("warn");

    let config = ServerConfig::load().unwrap_or_else(|e| {
        warn!("Ignoring configuration: {}", e);
        ServerConfig::default()
    });

    let addr = match target_addr(&config) {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Invalid server address: {e}");
            std::process::exit(1);
        }
    };

    let code = match run(addr, &config).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };
    std::process::exit(code);
}

fn target_addr(config: &ServerConfig) -> Result<SocketAddr, std::net::AddrParseError> {
    match std::env::args().nth(1) {
        Some(arg) => parse_socket_addr(&arg),
        None => parse_socket_addr(&config.socket_addr()).map(connect_addr),
    }
}

async fn run(addr: SocketAddr, config: &ServerConfig) -> std::io::Result<()> {
    let stream = TcpStream::connect(addr).await?;
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    let signal = read_server_line(&mut reader).await?;
    if signal == responses::FULL {
        print!("{signal}");
        return Ok(());
    }

    let Some(name) =
        negotiate_name(&mut reader, &mut writer, &mut stdin, config.max_name_length).await?
    else {
        return Ok(());
    };

    print!("{}", read_server_line(&mut reader).await?);

    let (name_tx, name_rx) = watch::channel(name);
    let (quit_tx, quit_rx) = watch::channel(false);

    let receiver = tokio::spawn(receive_loop(reader, name_tx, quit_tx.clone(), quit_rx.clone()));
    let sender = tokio::spawn(send_loop(
        writer,
        stdin,
        config.buffer_size,
        name_rx,
        quit_tx,
        quit_rx,
    ));

    let (received, sent) = tokio::join!(receiver, sender);
    if let Ok(Err(e)) = sent {
        warn!("Send task ended with error: {}", e);
    }
    if let Ok(Err(e)) = received {
        warn!("Receive task ended with error: {}", e);
    }
    Ok(())
}

/// Reads one line from the server, treating EOF as an error.
async fn read_server_line(reader: &mut BufReader<OwnedReadHalf>) -> std::io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "server closed the connection",
        ));
    }
    Ok(line)
}

/// Prompts until the server accepts a username. `None` when stdin runs dry.
async fn negotiate_name(
    reader: &mut BufReader<OwnedReadHalf>,
    writer: &mut OwnedWriteHalf,
    stdin: &mut StdinLines,
    max_name_length: usize,
) -> std::io::Result<Option<String>> {
    loop {
        prompt("Enter username");
        let Some(line) = stdin.next_line().await? else {
            return Ok(None);
        };

        let candidate = strip_line_ending(&line);
        if !is_valid_name(candidate, max_name_length) {
            print!("{}", responses::invalid_name_entered(max_name_length));
            continue;
        }

        writer.write_all(format!("{candidate}\n").as_bytes()).await?;
        let reply = read_server_line(reader).await?;
        if reply == responses::NAME_UNIQUE {
            return Ok(Some(candidate.to_string()));
        } else if reply == responses::NAME_NOT_UNIQUE {
            print!("{}", responses::NAME_TAKEN);
        } else {
            print!("{}", responses::invalid_name_entered(max_name_length));
        }
    }
}

/// Prints everything the server sends, tracking renames, until the server
/// closes the connection.
async fn receive_loop(
    mut reader: BufReader<OwnedReadHalf>,
    name_tx: watch::Sender<String>,
    quit_tx: watch::Sender<bool>,
    quit_rx: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let mut line = String::new();

    let result = loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e),
        }

        // Clear the half-typed prompt before printing
        print!("\x1b[2K\r{line}");

        if let Some(rest) = line.strip_prefix(responses::RENAMED_PREFIX) {
            let new_name = rest.trim_end_matches(['.', '\n', '\r']);
            name_tx.send_replace(new_name.to_string());
        }

        if !*quit_rx.borrow() {
            prompt(&name_tx.borrow());
        }
    };

    if !*quit_rx.borrow() {
        println!("\x1b[2K\rConnection closed by server.");
    }
    quit_tx.send_replace(true);
    result
}

/// Reads stdin and forwards lines to the server until `/quit`, stdin EOF,
/// or the receive task reports that the connection is gone.
async fn send_loop(
    mut writer: OwnedWriteHalf,
    mut stdin: StdinLines,
    buffer_size: usize,
    name_rx: watch::Receiver<String>,
    quit_tx: watch::Sender<bool>,
    mut quit_rx: watch::Receiver<bool>,
) -> std::io::Result<()> {
    loop {
        prompt(&name_rx.borrow());
        let next = tokio::select! {
            next = stdin.next_line() => next?,
            _ = wait_for_quit(&mut quit_rx) => return Ok(()),
        };

        let Some(line) = next else {
            // stdin closed: leave the server cleanly
            quit_tx.send_replace(true);
            writer.write_all(b"/quit\n").await?;
            return Ok(());
        };

        let text = strip_line_ending(&line);
        if text.is_empty() || text.len() > buffer_size {
            print!("{}", responses::message_length(buffer_size));
            continue;
        }

        if text == "/help" {
            print!("{}", responses::HELP);
            continue;
        }

        if text == "/quit" {
            quit_tx.send_replace(true);
        }
        writer.write_all(format!("{text}\n").as_bytes()).await?;
        if *quit_rx.borrow() {
            return Ok(());
        }
    }
}

async fn wait_for_quit(quit_rx: &mut watch::Receiver<bool>) {
    // An error means the sender is gone, which also ends the session.
    let _ = quit_rx.wait_for(|quit| *quit).await;
}

fn prompt(label: &str) {
    print!("{label}: ");
    let _ = std::io::stdout().flush();
}
