/*!

Global control over diagnostic messages. A message is tagged with a `Channel` and a level and is only emitted
when the global verbosity is at least that level.

Level 0 is off. Level 1 is "normal" enabled and carries errors. Level 4 traces environment updates and script
statements. Level 5 traces every binding the unpacker produces. Level n includes all messages in levels m < n.

*/

pub use verbosity::*;


pub(crate) mod verbosity {
  use std::{
    io::{Stdout, stdout, Write},
    sync::{
      atomic::{AtomicI32, Ordering},
      Mutex,
      PoisonError
    }
  };

  use lazy_static::lazy_static;
  use strum_macros::{Display, IntoStaticStr};
  use yansi::Paint;

  static VERBOSITY: AtomicI32 = AtomicI32::new(0);
  lazy_static! {
    static ref VERBOSE_STREAM: Mutex<Stdout> = Mutex::new(stdout());
  }

  #[derive(Copy, Clone, PartialEq, Eq, Debug, Display, IntoStaticStr)]
  pub enum Channel {
    Error,
    Warning,
    Notice,
    Debug,
  }

  impl Channel {
    fn tag(&self) -> String {
      let name: &'static str = self.into();
      match self {
        Channel::Error   => Paint::red(name).bold().to_string(),
        Channel::Warning => Paint::yellow(name).to_string(),
        Channel::Notice  => Paint::blue(name).to_string(),
        Channel::Debug   => Paint::new(name).dimmed().to_string(),
      }
    }
  }

  fn verbosity_is_at_least(lvl: i32) -> bool {
    VERBOSITY.load(Ordering::Relaxed) >= lvl
  }

  pub fn set_verbosity(new_value: i32) {
    VERBOSITY.store(new_value, Ordering::Relaxed);
  }

  pub fn get_verbosity() -> i32 {
    VERBOSITY.load(Ordering::Relaxed)
  }

  pub(crate) fn verbose_emit(msg: &str) {
    let mut stream = VERBOSE_STREAM.lock().unwrap_or_else(PoisonError::into_inner);
    let _ = stream.write_all(msg.as_bytes());
    let _ = stream.write_all(b"\n");
  }

  /// Only emits a message if the verbosity level is at least `level`.
  pub(crate) fn log_at_level(level: i32, msg: &str) {
    if verbosity_is_at_least(level) {
      verbose_emit(msg);
    }
  }

  /// Emits `msg` tagged with `channel` if the verbosity level is at least `level`.
  pub fn log(channel: Channel, level: i32, msg: &str) {
    if verbosity_is_at_least(level) {
      verbose_emit(format!("[{}] {}", channel.tag(), msg).as_str());
    }
  }
}
