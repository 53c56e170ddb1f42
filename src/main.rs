mod app_service;
mod app_state;
mod commands;
mod config;
mod error;
mod forms;
mod guard;
mod model;
mod service;
mod session;
mod storage;
mod ui;

use anyhow::Context;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::app_service::PortalService;
use crate::app_state::{App, AppEvent};
use crate::commands::AppCommand;
use crate::config::PortalConfig;
use crate::guard::{SqliteTokenStore, TokenStore};
use crate::session::ApiSession;
use crate::ui::draw;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let log_dir = std::path::PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join(format!("app-{}.log", ts));
    let log_file = std::fs::File::create(log_path)?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file))) // TUI 占用终端，日志写文件
        .filter_level(log::LevelFilter::Warn)
        .filter_module("assoc_portal", log::LevelFilter::Info)
        .filter_module("sqlx", log::LevelFilter::Error)
        .filter_module("sea_orm", log::LevelFilter::Error)
        .init();

    let (cfg, mut session_info) = PortalConfig::load();

    // 初始化本地存储（保存登录 token）
    session_info.push("正在初始化本地存储...".to_string());
    let db = storage::establish_connection(&cfg.database_url)
        .await
        .with_context(|| format!("本地存储初始化失败: {}", cfg.database_url))?;
    session_info.push("✓ 本地存储就绪".to_string());
    let db = Arc::new(db);
    let store: Arc<dyn TokenStore> = Arc::new(SqliteTokenStore::new(db));

    let session = Arc::new(
        ApiSession::new(&cfg.api_url, cfg.http_timeout).context("无法创建 HTTP 客户端")?,
    );
    log::info!("portal started, api = {}", session);

    // 创建核心 Channel (使用 AppCommand)
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<AppCommand>();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<AppEvent>();

    // 启动单后台任务模型 (Actor)
    let service = PortalService::new(session, store, evt_tx);
    match service.restore_session().await {
        Some(user) => session_info.push(format!("✓ 已恢复登录状态: {}", user)),
        None => match cfg.login.clone() {
            Some((username, password)) => {
                session_info.push(format!("正在使用配置账号登录: {}", username));
                let _ = cmd_tx.send(AppCommand::Login { username, password });
            }
            None => session_info.push("未登录，按 l 登录管理员账号".to_string()),
        },
    }
    tokio::spawn(service.run(cmd_rx));
    let _ = cmd_tx.send(AppCommand::RefreshAll);

    // TUI 初始化
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session_info, cfg.api_url.clone(), cmd_tx, evt_rx);

    // 主循环
    let res = match app.evt_rx.take() {
        Some(rx) => run_app_loop(&mut terminal, &mut app, rx).await,
        None => Ok(()),
    };

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = res {
        log::error!("ui loop exited with error: {}", e);
    }
    res.context("界面主循环异常退出")
}

async fn run_app_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut evt_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        while let Ok(event) = evt_rx.try_recv() {
            app.apply_event(event);
        }

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key_event(key.code) {
                    return Ok(());
                }
            }
        }
    }
}
