use crate::forms::FormOutput;
use crate::model::Resource;
use std::path::PathBuf;
use std::str::FromStr;

/// 发给后台任务的命令
#[derive(Debug, Clone)]
pub enum AppCommand {
    Refresh(Resource),
    RefreshAll,
    GetDetail {
        resource: Resource,
        id: String,
    },
    CheckSession {
        require_admin: bool,
    },
    Login {
        username: String,
        password: String,
    },
    Logout,
    WhoAmI,
    Submit(FormOutput),
    Delete {
        resource: Resource,
        id: String,
    },
    Upload {
        path: PathBuf,
    },
    Help,
}

/// 命令行输入的解析结果；前几种只在界面内处理
#[derive(Debug, Clone)]
pub enum CommandInput {
    Quit,
    Admin,
    /// 空字符串表示清除过滤
    Filter(String),
    Invalid(String),
    Send(AppCommand),
}

pub const HELP_TEXT: &str = "可用命令: login <用户名> <密码> | logout | whoami | admin | refresh [players|events|insights] | upload <文件路径> | filter <关键字>|clear | help | quit";

impl FromStr for CommandInput {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(CommandInput::Invalid("空命令".to_string()));
        }

        let send = |cmd| Ok(CommandInput::Send(cmd));
        match parts[0] {
            "login" => match (parts.get(1), parts.get(2)) {
                (Some(u), Some(_)) => send(AppCommand::Login {
                    username: u.to_string(),
                    // 密码里可能有空格
                    password: parts[2..].join(" "),
                }),
                _ => Ok(CommandInput::Invalid("用法: login <用户名> <密码>".to_string())),
            },
            "logout" => send(AppCommand::Logout),
            "whoami" => send(AppCommand::WhoAmI),
            "admin" => Ok(CommandInput::Admin),
            "refresh" | "r" => match parts.get(1) {
                None => send(AppCommand::RefreshAll),
                Some(what) => match Resource::parse(what) {
                    Some(res) => send(AppCommand::Refresh(res)),
                    None => Ok(CommandInput::Invalid(format!("未知资源: {}", what))),
                },
            },
            "upload" => {
                let path = parts[1..].join(" ");
                if path.is_empty() {
                    Ok(CommandInput::Invalid("用法: upload <文件路径>".to_string()))
                } else {
                    send(AppCommand::Upload {
                        path: PathBuf::from(path),
                    })
                }
            }
            "filter" => {
                let query = parts[1..].join(" ");
                match query.as_str() {
                    "clear" | "--clear" => Ok(CommandInput::Filter(String::new())),
                    _ => Ok(CommandInput::Filter(query)),
                }
            }
            "help" | "h" => send(AppCommand::Help),
            "quit" | "q" | "exit" => Ok(CommandInput::Quit),
            _ => Ok(CommandInput::Invalid(format!("未知命令: {}", parts[0]))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> CommandInput {
        CommandInput::from_str(s).unwrap()
    }

    #[test]
    fn login_keeps_spaces_in_password() {
        match parse("login admin correct horse") {
            CommandInput::Send(AppCommand::Login { username, password }) => {
                assert_eq!(username, "admin");
                assert_eq!(password, "correct horse");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(parse("login admin"), CommandInput::Invalid(_)));
    }

    #[test]
    fn refresh_variants() {
        assert!(matches!(
            parse("refresh"),
            CommandInput::Send(AppCommand::RefreshAll)
        ));
        assert!(matches!(
            parse("refresh articles"),
            CommandInput::Send(AppCommand::Refresh(Resource::Insights))
        ));
        assert!(matches!(parse("refresh coaches"), CommandInput::Invalid(_)));
    }

    #[test]
    fn filter_needs_exact_keyword() {
        match parse("filter hearts of oak") {
            CommandInput::Filter(q) => assert_eq!(q, "hearts of oak"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(parse("filter"), CommandInput::Filter(q) if q.is_empty()));
        assert!(matches!(parse("filter clear"), CommandInput::Filter(q) if q.is_empty()));
        assert!(matches!(parse("filterfoo"), CommandInput::Invalid(_)));
    }

    #[test]
    fn upload_and_local_commands() {
        match parse("upload /tmp/my photo.jpg") {
            CommandInput::Send(AppCommand::Upload { path }) => {
                assert_eq!(path, PathBuf::from("/tmp/my photo.jpg"))
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(parse("upload"), CommandInput::Invalid(_)));
        assert!(matches!(parse("dance"), CommandInput::Invalid(_)));
        assert!(matches!(parse("q"), CommandInput::Quit));
        assert!(matches!(parse("admin"), CommandInput::Admin));
    }
}
