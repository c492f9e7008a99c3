//! Line-oriented command parsing for the headless binary.

use thiserror::Error;

use crate::coords::PixelPos;
use crate::drawing::TrendlineId;
use crate::events::Command;

pub const HELP: &str = "\
commands:
  draw | cancel | toggle       enter, leave or flip drawing mode
  click X Y                    click at a pixel position
  down X Y | move X Y | up     pointer press, move and release
  delete ID | clear            delete one or all trendlines
  select [ID]                  show a trendline's coordinates (no ID clears)
  resize W H                   change the plot size
  symbol SYM | refresh         switch pair or reload prices
  list | help | quit";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    List,
    Help,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
}

/// Parse one line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Input>, InputError> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let cmd = match word.to_ascii_lowercase().as_str() {
        "draw" => Command::StartDrawing,
        "cancel" => Command::CancelDrawing,
        "toggle" => Command::ToggleDrawing,
        "click" => Command::Click(pixel("click", &args)?),
        "down" => Command::PointerDown(pixel("down", &args)?),
        "move" => Command::PointerMove(pixel("move", &args)?),
        "up" => Command::PointerUp,
        "delete" | "rm" => match args.first() {
            Some(id) => Command::Delete(TrendlineId::from(*id)),
            None => {
                return Err(InputError::MissingArgument {
                    command: "delete",
                    expected: "a trendline id",
                })
            }
        },
        "clear" => Command::ClearAll,
        "select" => Command::Select(args.first().map(|id| TrendlineId::from(*id))),
        "resize" => {
            let size = pixel("resize", &args)?;
            Command::Resize {
                width: size.x,
                height: size.y,
            }
        }
        "symbol" => match args.first() {
            Some(sym) => Command::SwitchSymbol(sym.to_ascii_uppercase()),
            None => {
                return Err(InputError::MissingArgument {
                    command: "symbol",
                    expected: "a trading pair",
                })
            }
        },
        "refresh" => Command::Refresh,
        "quit" | "exit" => Command::Quit,
        "list" | "ls" => return Ok(Some(Input::List)),
        "help" | "?" => return Ok(Some(Input::Help)),
        _ => return Err(InputError::Unknown(word.to_string())),
    };
    Ok(Some(Input::Command(cmd)))
}

fn pixel(command: &'static str, args: &[&str]) -> Result<PixelPos, InputError> {
    let [x, y, ..] = args else {
        return Err(InputError::MissingArgument {
            command,
            expected: "two numbers",
        });
    };
    Ok(PixelPos::new(number(x)?, number(y)?))
}

fn number(arg: &str) -> Result<f64, InputError> {
    match arg.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(InputError::InvalidNumber(arg.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(line: &str) -> Command {
        match parse_command(line) {
            Ok(Some(Input::Command(cmd))) => cmd,
            other => panic!("expected a command for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(cmd("draw"), Command::StartDrawing);
        assert_eq!(cmd("CANCEL"), Command::CancelDrawing);
        assert_eq!(cmd("up"), Command::PointerUp);
        assert_eq!(cmd("clear"), Command::ClearAll);
        assert_eq!(cmd("quit"), Command::Quit);
        assert_eq!(parse_command("list"), Ok(Some(Input::List)));
    }

    #[test]
    fn test_pointer_commands() {
        assert_eq!(cmd("click 10 20.5"), Command::Click(PixelPos::new(10.0, 20.5)));
        assert_eq!(cmd("move -3 4"), Command::PointerMove(PixelPos::new(-3.0, 4.0)));
        assert_eq!(cmd("resize 800 400"), Command::Resize { width: 800.0, height: 400.0 });
    }

    #[test]
    fn test_id_arguments() {
        assert_eq!(cmd("delete 1700000000000"), Command::Delete(TrendlineId::from("1700000000000")));
        assert_eq!(cmd("select 42"), Command::Select(Some(TrendlineId::from("42"))));
        assert_eq!(cmd("select"), Command::Select(None));
        assert_eq!(cmd("symbol ethusdt"), Command::SwitchSymbol("ETHUSDT".into()));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_command("fly"), Err(InputError::Unknown("fly".into())));
        assert!(matches!(parse_command("click 10"), Err(InputError::MissingArgument { command: "click", .. })));
        assert_eq!(parse_command("down 1 nan"), Err(InputError::InvalidNumber("nan".into())));
        assert_eq!(parse_command("move x 1"), Err(InputError::InvalidNumber("x".into())));
        assert!(parse_command("delete").is_err());
    }
}
