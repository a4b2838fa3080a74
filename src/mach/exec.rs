use super::{eval, CancelToken, Var};
use crate::error;
use crate::lang::token::Token;
use crate::lang::{lex, parse_print, Error, LineNumber, PrintItem};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};

type Result<T> = std::result::Result<T, Error>;

/// Runs every statement the engine doesn't handle itself.
///
/// `text` is the statement exactly as written. Returning `Some(line)`
/// transfers control as if by GOTO; `None` continues with the next
/// statement. Errors are passed through to the caller of the run.
pub trait Execute {
    fn execute(
        &mut self,
        text: &str,
        vars: &mut Var,
        cancel: &CancelToken,
    ) -> Result<Option<LineNumber>>;
}

const ZONE_WIDTH: usize = 14;

/// ## PRINT to a bounded channel
///
/// Output never blocks the program. When the receiver falls behind and
/// the channel is full, the text is dropped.
pub struct Console {
    sender: SyncSender<String>,
    column: usize,
    dropped: usize,
}

impl Console {
    pub fn new(capacity: usize) -> (Console, Receiver<String>) {
        let (sender, receiver) = sync_channel(capacity);
        (
            Console {
                sender,
                column: 0,
                dropped: 0,
            },
            receiver,
        )
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn print(&mut self, args: &str, vars: &Var) -> Result<()> {
        let items = parse_print(args)?;
        let mut s = String::new();
        let mut newline = true;
        for item in &items {
            match item {
                PrintItem::Expression(expr) => {
                    let val = eval::evaluate(expr, vars)?;
                    s.push_str(&val.to_string());
                    newline = true;
                }
                PrintItem::Comma => {
                    let column = self.column + s.chars().count();
                    let pad = ZONE_WIDTH - column % ZONE_WIDTH;
                    s.extend(std::iter::repeat(' ').take(pad));
                    newline = false;
                }
                PrintItem::Semicolon => newline = false,
            }
        }
        if newline {
            s.push('\n');
            self.column = 0;
        } else {
            self.column += s.chars().count();
        }
        self.send(s);
        Ok(())
    }

    fn send(&mut self, s: String) {
        match self.sender.try_send(s) {
            Ok(()) => {}
            Err(TrySendError::Full(s)) => {
                self.dropped += 1;
                log::trace!("output channel full, dropped {:?}", s);
            }
            Err(TrySendError::Disconnected(_)) => {
                log::trace!("output channel closed");
            }
        }
    }
}

impl Execute for Console {
    fn execute(
        &mut self,
        text: &str,
        vars: &mut Var,
        _cancel: &CancelToken,
    ) -> Result<Option<LineNumber>> {
        let tokens = lex(text);
        let args = match tokens.first() {
            Some((col, Token::Ident(word))) if word == "PRINT" => &text[col.end..],
            Some((col, Token::Unknown('?'))) => &text[col.end..],
            _ => return Err(error!(SyntaxError; "UNKNOWN STATEMENT")),
        };
        self.print(args, vars)?;
        Ok(None)
    }
}
