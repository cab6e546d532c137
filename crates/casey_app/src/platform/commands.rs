//! Line commands typed into the interactive wizard.

use std::path::PathBuf;

use casey_core::{InputSource, Msg, TargetChoice, TestId, ToastId};

pub const HELP: &str = "\
Commands:
  generate | direct          choose how to start
  source <figma|document|manual|website>
  figma <key>                Figma file key
  prompt <text>              manual requirements
  url <url>                  website to analyse
  doc <path>                 requirements document
  upload <path>              test-case file (direct testing)
  next                       continue (generate, proceed, execute)
  step <n> | back <n>        jump to a step
  toggle <id>...             select or deselect tests
  all | none                 select all / clear selection
  target source | target <url>
  live on|off                show the browser while testing
  export tests|results|report
  dismiss <toast>            close a notification
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Vec<Msg>),
    /// Needs file metadata before it becomes `Msg::DocumentChosen`.
    Document(PathBuf),
    /// Needs file metadata before it becomes `Msg::UploadChosen`.
    Upload(PathBuf),
    Dismiss(ToastId),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let msg = match word.to_ascii_lowercase().as_str() {
        "generate" => Msg::ChooseGeneration,
        "direct" => Msg::ChooseDirectTesting,
        "source" => {
            let source = InputSource::from_test_type(rest)
                .ok_or_else(|| format!("unknown source '{rest}'"))?;
            Msg::SourceSelected(source)
        }
        "figma" => Msg::FigmaKeyChanged(rest.to_string()),
        "prompt" => Msg::ManualPromptChanged(rest.to_string()),
        "url" => Msg::SourceUrlChanged(rest.to_string()),
        "doc" => return Ok(Command::Document(path_arg(rest)?)),
        "upload" => return Ok(Command::Upload(path_arg(rest)?)),
        "next" => Msg::Next,
        "step" => Msg::GoToStep(step_arg(rest)?),
        "back" => Msg::GoBackToStep(step_arg(rest)?),
        "toggle" => {
            if rest.is_empty() {
                return Err("toggle needs at least one test id".to_string());
            }
            let ids = rest
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|part| !part.is_empty())
                .map(|part| {
                    part.parse::<TestId>()
                        .map_err(|_| format!("'{part}' is not a test id"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Command::Dispatch(
                ids.into_iter().map(Msg::ToggleTest).collect(),
            ));
        }
        "all" => Msg::SelectAll,
        "none" => Msg::ClearSelection,
        "target" => match rest {
            "" => return Err("usage: target source | target <url>".to_string()),
            "source" => Msg::TargetChoiceChanged(TargetChoice::UseSourceUrl),
            url => {
                return Ok(Command::Dispatch(vec![
                    Msg::TargetChoiceChanged(TargetChoice::DifferentUrl),
                    Msg::TargetUrlChanged(url.to_string()),
                ]))
            }
        },
        "live" => match rest {
            "on" => Msg::LiveTestingToggled(true),
            "off" => Msg::LiveTestingToggled(false),
            _ => return Err("usage: live on|off".to_string()),
        },
        "export" => match rest {
            "tests" => Msg::ExportTests,
            "results" => Msg::ExportResults,
            "report" => Msg::ExportReport,
            _ => return Err("usage: export tests|results|report".to_string()),
        },
        "dismiss" => {
            let id = rest
                .parse::<ToastId>()
                .map_err(|_| "usage: dismiss <toast id>".to_string())?;
            return Ok(Command::Dismiss(id));
        }
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Command::Dispatch(vec![msg]))
}

fn path_arg(rest: &str) -> Result<PathBuf, String> {
    if rest.is_empty() {
        return Err("a file path is required".to_string());
    }
    Ok(PathBuf::from(rest))
}

fn step_arg(rest: &str) -> Result<u8, String> {
    rest.parse::<u8>()
        .map_err(|_| format!("'{rest}' is not a step number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(line: &str) -> Msg {
        match parse_command(line) {
            Ok(Command::Dispatch(mut msgs)) if msgs.len() == 1 => msgs.remove(0),
            other => panic!("unexpected parse of {line:?}: {other:?}"),
        }
    }

    #[test]
    fn free_text_keeps_inner_spaces() {
        assert_eq!(
            single("prompt  Users can reset their password "),
            Msg::ManualPromptChanged("Users can reset their password".to_string())
        );
        assert_eq!(single("SOURCE Website"), Msg::SourceSelected(InputSource::Website));
        assert_eq!(single("step 3"), Msg::GoToStep(3));
        assert_eq!(single("live off"), Msg::LiveTestingToggled(false));
    }

    #[test]
    fn target_url_switches_choice_first() {
        assert_eq!(
            parse_command("target https://staging.example.com"),
            Ok(Command::Dispatch(vec![
                Msg::TargetChoiceChanged(TargetChoice::DifferentUrl),
                Msg::TargetUrlChanged("https://staging.example.com".to_string()),
            ]))
        );
        assert_eq!(
            single("target source"),
            Msg::TargetChoiceChanged(TargetChoice::UseSourceUrl)
        );
    }

    #[test]
    fn toggle_accepts_several_ids() {
        assert_eq!(
            parse_command("toggle 1, 3 4"),
            Ok(Command::Dispatch(vec![
                Msg::ToggleTest(1),
                Msg::ToggleTest(3),
                Msg::ToggleTest(4),
            ]))
        );
        assert!(parse_command("toggle x").is_err());
    }

    #[test]
    fn file_commands_and_controls() {
        assert_eq!(
            parse_command("upload ./suite one.pdf"),
            Ok(Command::Upload(PathBuf::from("./suite one.pdf")))
        );
        assert_eq!(parse_command("dismiss 2"), Ok(Command::Dismiss(2)));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
        assert!(parse_command("doc").is_err());
        assert!(parse_command("source pdf").is_err());
        assert!(parse_command("launch").is_err());
    }
}
