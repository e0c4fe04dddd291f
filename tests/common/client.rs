//! Test IRC client.
//!
//! A thin client over a raw TCP connection that can send commands and
//! assert on the numeric/command replies a real client would see.

#![allow(dead_code)]

use irc_proto::{Command, Message, Response};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    nick: String,
}

impl TestClient {
    pub async fn connect(address: &str, nick: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            nick: nick.to_string(),
        })
    }

    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    pub async fn send(&mut self, cmd: Command) -> anyhow::Result<()> {
        self.send_raw(&Message::new(cmd).to_string()).await
    }

    pub async fn recv(&mut self) -> anyhow::Result<Message> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Message> {
        let mut line = String::new();
        timeout(dur, self.reader.read_line(&mut line)).await??;
        line.trim_end().parse::<Message>().map_err(|e| anyhow::anyhow!("parse error: {e}"))
    }

    /// Receive messages until `predicate` matches one, returning every
    /// message seen along the way (inclusive of the match).
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<Message>>
    where
        F: FnMut(&Message) -> bool,
    {
        let mut messages = Vec::new();
        loop {
            let msg = self.recv().await?;
            let done = predicate(&msg);
            messages.push(msg);
            if done {
                break;
            }
        }
        Ok(messages)
    }

    /// NICK + USER, waiting for RPL_WELCOME.
    pub async fn register(&mut self) -> anyhow::Result<Vec<Message>> {
        self.send(Command::Nick(self.nick.clone())).await?;
        self.send(Command::User {
            user: self.nick.clone(),
            mode: "0".to_string(),
            realname: format!("Test User {}", self.nick),
        })
        .await?;

        self.recv_until(|msg| matches!(&msg.command, Command::Response(r, _) if *r == Response::RPL_WELCOME)).await
    }

    pub async fn join(&mut self, channel: &str) -> anyhow::Result<()> {
        self.send(Command::Join(vec![channel.to_string()], vec![])).await
    }

    pub async fn join_with_key(&mut self, channel: &str, key: &str) -> anyhow::Result<()> {
        self.send(Command::Join(vec![channel.to_string()], vec![key.to_string()])).await
    }

    pub async fn privmsg(&mut self, target: &str, text: &str) -> anyhow::Result<()> {
        self.send(Command::Privmsg(target.to_string(), text.to_string())).await
    }

    pub async fn part(&mut self, channel: &str, reason: Option<&str>) -> anyhow::Result<()> {
        self.send(Command::Part(vec![channel.to_string()], reason.map(|r| r.to_string()))).await
    }

    pub async fn quit(&mut self, reason: Option<&str>) -> anyhow::Result<()> {
        self.send(Command::Quit(reason.map(|r| r.to_string()))).await
    }

    pub async fn mode(&mut self, target: &str, changes: &[&str]) -> anyhow::Result<()> {
        self.send(Command::Mode(target.to_string(), changes.iter().map(|s| s.to_string()).collect())).await
    }

    pub async fn kick(&mut self, channel: &str, target: &str, reason: Option<&str>) -> anyhow::Result<()> {
        self.send(Command::Kick(channel.to_string(), target.to_string(), reason.map(|r| r.to_string()))).await
    }
}

/// True if `msg` is a numeric reply with the given code.
pub fn is_numeric(msg: &Message, response: Response) -> bool {
    matches!(&msg.command, Command::Response(r, _) if *r == response)
}
