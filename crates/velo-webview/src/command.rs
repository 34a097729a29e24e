//! Requests posted to the loop thread from anywhere.

use std::sync::mpsc::{self, Receiver, Sender};

use tracing::debug;
use velo_common::{MenuItemId, WindowPosition, WindowSize};
use velo_tray::QuitHandle;

use crate::ipc::MessageReply;

#[derive(Debug, Clone, PartialEq)]
pub enum TrayCommand {
    SetIcon(Vec<u8>),
    SetTooltip(String),
    SetTitle(String),
    SetItemLabel(MenuItemId, String),
    SetItemChecked(MenuItemId, bool),
    SetItemDisabled(MenuItemId, bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Eval(String),
    SetUrl(String),
    SetTitle(String),
    SetSize(WindowSize),
    SetPosition(WindowPosition),
    /// `None` lifts the limit.
    SetMinSize(Option<WindowSize>),
    SetMaxSize(Option<WindowSize>),
    SetAlwaysOnTop(bool),
    SendMessage(serde_json::Value),
    Reply(MessageReply),
    Show,
    Hide,
    Minimize,
    Maximize,
    Restore,
    Fullscreen,
    UnFullscreen,
    /// Destroy the window and end the loop.
    Close,
    Tray(TrayCommand),
}

/// Cloneable, `Send` handle for driving the shell from other threads.
///
/// Commands run on the loop thread in the order they were posted. Posting
/// after the loop has exited is silently ignored.
#[derive(Debug, Clone)]
pub struct ShellProxy {
    commands: Sender<ShellCommand>,
    quit: QuitHandle,
}

impl ShellProxy {
    pub fn new(quit: QuitHandle) -> (Self, Receiver<ShellCommand>) {
        let (commands, rx) = mpsc::channel();
        (Self { commands, quit }, rx)
    }

    pub fn send(&self, command: ShellCommand) {
        if self.commands.send(command).is_err() {
            debug!("shell loop gone, command dropped");
        }
    }

    pub fn eval(&self, js: impl Into<String>) {
        self.send(ShellCommand::Eval(js.into()));
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.send(ShellCommand::SetUrl(url.into()));
    }

    pub fn send_message(&self, payload: serde_json::Value) {
        self.send(ShellCommand::SendMessage(payload));
    }

    pub fn reply(&self, reply: MessageReply) {
        self.send(ShellCommand::Reply(reply));
    }

    pub fn tray(&self, command: TrayCommand) {
        self.send(ShellCommand::Tray(command));
    }

    /// Ask the loop to exit. Takes effect even if the command queue is
    /// backed up.
    pub fn quit(&self) {
        self.quit.request();
    }
}
