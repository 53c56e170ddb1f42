use crate::commands::{AppCommand, CommandInput};
use crate::forms::{FieldKind, FormKind, FormState};
use crate::guard::AuthState;
use crate::model::{Event, Insight, Player, Position, Resource};
use crossterm::event::KeyCode;
use ratatui::widgets::ListState;
use std::collections::HashSet;
use std::str::FromStr;
use tokio::sync::mpsc;

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ViewMode {
    List(Resource),
    Detail,
    Form,
}

#[derive(PartialEq, Debug, Clone)]
pub enum InputMode {
    Normal,
    Command,
}

#[derive(PartialEq, Debug, Clone)]
pub enum FocusArea {
    Menu,     // 焦点在左侧菜单
    MainView, // 焦点在主视图
}

/// 受保护的操作：通过守卫后自动继续
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum AdminAction {
    Enter,
    New,
    Edit,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailItem {
    Player(Player),
    Event(Event),
    Insight(Insight),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingDelete {
    pub resource: Resource,
    pub id: String,
    pub label: String,
}

#[derive(Debug)]
pub enum AppEvent {
    Log(String),
    Message(String),
    Error(String),
    Players(Vec<Player>),
    Events(Vec<Event>),
    Insights(Vec<Insight>),
    LoadFailed { resource: Resource, message: String },
    Detail(DetailItem),
    Auth(AuthState),
    LoggedIn { username: String },
    LoginFailed(String),
    LoggedOut,
    Saved { resource: Resource },
    SaveFailed(String),
    Deleted { resource: Resource, id: String },
    Uploaded(String),
}

pub const MENU_ITEMS: [&str; 4] = ["球员", "活动", "文章", "管理面板"];

pub struct App {
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub focus_area: FocusArea,
    pub menu_selected_index: usize,
    pub players_all: Vec<Player>,
    pub players: Vec<Player>,
    pub events: Vec<Event>,
    pub insights: Vec<Insight>,
    pub loading: HashSet<Resource>,
    pub selected_index: usize,
    pub list_state: ListState,
    pub detail: Option<DetailItem>,
    pub detail_scroll: u16,
    pub form: Option<FormState>,
    pub return_view: ViewMode,
    pub filter_query: String,
    pub filter_position: Option<Position>,
    pub auth: AuthState,
    pub admin_mode: bool,
    pub pending_admin: Option<AdminAction>,
    pub pending_delete: Option<PendingDelete>,
    pub api_url: String,
    pub command_input: String,
    pub command_cursor: usize,
    pub command_history: Vec<String>,
    pub command_history_index: Option<usize>,
    pub log_messages: Vec<String>,
    pub cmd_tx: mpsc::UnboundedSender<AppCommand>,
    pub evt_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
}

impl App {
    pub fn new(
        session_info: Vec<String>,
        api_url: String,
        cmd_tx: mpsc::UnboundedSender<AppCommand>,
        evt_rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> App {
        let mut log_messages = vec!["应用已启动".to_string()];
        log_messages.extend(session_info);

        App {
            view_mode: ViewMode::List(Resource::Players),
            input_mode: InputMode::Normal,
            focus_area: FocusArea::Menu,
            menu_selected_index: 0,
            players_all: Vec::new(),
            players: Vec::new(),
            events: Vec::new(),
            insights: Vec::new(),
            loading: Resource::ALL.into_iter().collect(),
            selected_index: 0,
            list_state: {
                let mut s = ListState::default();
                s.select(Some(0));
                s
            },
            detail: None,
            detail_scroll: 0,
            form: None,
            return_view: ViewMode::List(Resource::Players),
            filter_query: String::new(),
            filter_position: None,
            auth: AuthState::Unknown,
            admin_mode: false,
            pending_admin: None,
            pending_delete: None,
            api_url,
            command_input: String::new(),
            command_cursor: 0,
            command_history: Vec::new(),
            command_history_index: None,
            log_messages,
            cmd_tx,
            evt_rx: Some(evt_rx),
        }
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
    }

    fn send(&mut self, cmd: AppCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            self.add_log("✗ 后台任务已停止".to_string());
        }
    }

    pub fn current_resource(&self) -> Option<Resource> {
        match self.view_mode {
            ViewMode::List(r) => Some(r),
            _ => None,
        }
    }

    pub fn list_len(&self) -> usize {
        match self.view_mode {
            ViewMode::List(Resource::Players) => self.players.len(),
            ViewMode::List(Resource::Events) => self.events.len(),
            ViewMode::List(Resource::Insights) => self.insights.len(),
            _ => 0,
        }
    }

    /// 当前选中项的 (id, 显示名)
    pub fn selected_item(&self) -> Option<(String, String)> {
        let i = self.selected_index;
        match self.view_mode {
            ViewMode::List(Resource::Players) => self
                .players
                .get(i)
                .map(|p| (p.id.clone(), p.full_name.clone())),
            ViewMode::List(Resource::Events) => {
                self.events.get(i).map(|e| (e.id.clone(), e.title.clone()))
            }
            ViewMode::List(Resource::Insights) => {
                self.insights.get(i).map(|a| (a.id.clone(), a.title.clone()))
            }
            _ => None,
        }
    }

    pub fn clamp_selection(&mut self) {
        if self.selected_index >= self.list_len() {
            self.selected_index = self.list_len().saturating_sub(1);
        }
        self.list_state.select(Some(self.selected_index));
    }

    /// 球员列表过滤：关键字匹配姓名或俱乐部，外加可选的位置
    pub fn apply_filters(&mut self) {
        self.players = self
            .players_all
            .iter()
            .filter(|p| p.matches(&self.filter_query))
            .filter(|p| match &self.filter_position {
                Some(pos) => &p.position == pos,
                None => true,
            })
            .cloned()
            .collect();
        if self.view_mode == ViewMode::List(Resource::Players) {
            self.clamp_selection();
        }
    }

    fn cycle_position_filter(&mut self) {
        self.filter_position = match &self.filter_position {
            None => Some(Position::Goalkeeper),
            Some(Position::Goalkeeper) => Some(Position::Defender),
            Some(Position::Defender) => Some(Position::Midfielder),
            Some(Position::Midfielder) => Some(Position::Forward),
            _ => None,
        };
        self.apply_filters();
    }

    pub fn show_list(&mut self, resource: Resource) {
        self.view_mode = ViewMode::List(resource);
        self.menu_selected_index = match resource {
            Resource::Players => 0,
            Resource::Events => 1,
            Resource::Insights => 2,
        };
        self.selected_index = 0;
        self.clamp_selection();
        self.loading.insert(resource);
        self.send(AppCommand::Refresh(resource));
    }

    pub fn request_detail(&mut self) {
        let Some(resource) = self.current_resource() else {
            return;
        };
        let Some((id, _)) = self.selected_item() else {
            return;
        };
        // 先用列表里的数据占位，后台再拉一次最新详情
        self.detail = match resource {
            Resource::Players => self.players.get(self.selected_index).cloned().map(DetailItem::Player),
            Resource::Events => self.events.get(self.selected_index).cloned().map(DetailItem::Event),
            Resource::Insights => self
                .insights
                .get(self.selected_index)
                .cloned()
                .map(DetailItem::Insight),
        };
        self.detail_scroll = 0;
        self.return_view = self.view_mode;
        self.view_mode = ViewMode::Detail;
        self.send(AppCommand::GetDetail { resource, id });
    }

    /// 进入受保护操作：进入管理面板总是远程校验；
    /// 面板内的新建/编辑/删除沿用本次校验结果，直到退出登录或收到 401
    pub fn require_admin(&mut self, action: AdminAction) {
        if action != AdminAction::Enter && self.admin_mode && self.auth.is_authenticated() {
            self.run_admin_action(action);
            return;
        }
        self.pending_admin = Some(action);
        self.auth = AuthState::Unknown;
        self.add_log("正在校验管理员身份...".to_string());
        self.send(AppCommand::CheckSession {
            require_admin: true,
        });
    }

    fn run_admin_action(&mut self, action: AdminAction) {
        match action {
            AdminAction::Enter => {
                self.add_log("✓ 已进入管理面板: n 新建 / e 编辑 / d 删除".to_string());
            }
            AdminAction::New => {
                let form = match self.current_resource() {
                    Some(Resource::Players) => FormState::new_player(),
                    Some(Resource::Events) => FormState::new_event(),
                    Some(Resource::Insights) => FormState::new_insight(),
                    None => return,
                };
                self.open_form(form);
            }
            AdminAction::Edit => {
                let i = self.selected_index;
                let form = match self.current_resource() {
                    Some(Resource::Players) => self.players.get(i).map(FormState::edit_player),
                    Some(Resource::Events) => self.events.get(i).map(FormState::edit_event),
                    Some(Resource::Insights) => self.insights.get(i).map(FormState::edit_insight),
                    None => None,
                };
                if let Some(form) = form {
                    self.open_form(form);
                }
            }
            AdminAction::Delete => {
                if let (Some(resource), Some((id, label))) =
                    (self.current_resource(), self.selected_item())
                {
                    self.add_log(format!(
                        "⚠ 确认删除{} \"{}\"？按 y 确认，其他键取消",
                        resource.label(),
                        label
                    ));
                    self.pending_delete = Some(PendingDelete {
                        resource,
                        id,
                        label,
                    });
                }
            }
        }
    }

    fn open_form(&mut self, form: FormState) {
        if self.view_mode != ViewMode::Form {
            self.return_view = self.view_mode;
        }
        self.form = Some(form);
        self.view_mode = ViewMode::Form;
        self.focus_area = FocusArea::MainView;
    }

    pub fn open_login(&mut self) {
        self.open_form(FormState::login());
    }

    fn close_form(&mut self) {
        self.form = None;
        self.view_mode = match self.return_view {
            ViewMode::Form => ViewMode::List(Resource::Players),
            v => v,
        };
        self.clamp_selection();
    }

    /// 表单提交：本地校验失败不会发出任何请求
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.submitting {
            return;
        }
        match form.validate() {
            Ok(output) => {
                form.error = None;
                form.submitting = true;
                self.send(AppCommand::Submit(output));
            }
            Err(msg) => {
                form.error = Some(msg.clone());
                self.add_log(format!("✗ {}", msg));
            }
        }
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Log(msg) | AppEvent::Message(msg) | AppEvent::Error(msg) => {
                self.log_messages.push(msg)
            }
            AppEvent::Players(list) => {
                self.loading.remove(&Resource::Players);
                self.players_all = list;
                self.apply_filters();
            }
            AppEvent::Events(list) => {
                self.loading.remove(&Resource::Events);
                self.events = list;
                self.clamp_selection();
            }
            AppEvent::Insights(list) => {
                self.loading.remove(&Resource::Insights);
                self.insights = list;
                self.clamp_selection();
            }
            AppEvent::LoadFailed { resource, message } => {
                self.loading.remove(&resource);
                self.add_log(format!("✗ 加载{}失败: {}", resource.label(), message));
            }
            AppEvent::Detail(item) => {
                if self.view_mode == ViewMode::Detail {
                    self.detail = Some(item);
                }
            }
            AppEvent::Auth(state) => self.apply_auth(state),
            AppEvent::LoggedIn { username } => {
                self.add_log(format!("✓ 登录成功: {}", username));
                self.auth = AuthState::Authenticated {
                    username: Some(username),
                };
                if self.form.as_ref().map(|f| f.kind) == Some(FormKind::Login) {
                    self.close_form();
                }
                if self.pending_admin.is_some() {
                    // 新 token 同样要经过管理员校验
                    self.auth = AuthState::Unknown;
                    self.send(AppCommand::CheckSession {
                        require_admin: true,
                    });
                }
            }
            AppEvent::LoginFailed(msg) => {
                self.add_log(format!("✗ 登录失败: {}", msg));
                if let Some(form) = self.form.as_mut().filter(|f| f.kind == FormKind::Login) {
                    form.submitting = false;
                    form.error = Some(msg);
                }
            }
            AppEvent::LoggedOut => {
                self.auth = AuthState::Unauthenticated;
                self.admin_mode = false;
                self.pending_admin = None;
                self.pending_delete = None;
                self.add_log("✓ 已退出登录".to_string());
            }
            AppEvent::Saved { resource } => {
                self.add_log(format!("✓ {}已保存", resource.label()));
                if let Some(form) = self.form.as_mut() {
                    form.reset();
                }
                self.form = None;
                self.view_mode = ViewMode::List(resource);
                self.clamp_selection();
                self.loading.insert(resource);
            }
            AppEvent::SaveFailed(msg) => {
                self.add_log(format!("✗ 保存失败: {}", msg));
                if let Some(form) = self.form.as_mut() {
                    form.submitting = false;
                    form.error = Some(msg);
                }
            }
            AppEvent::Deleted { resource, id } => {
                match resource {
                    Resource::Players => {
                        self.players_all.retain(|p| p.id != id);
                        self.apply_filters();
                    }
                    Resource::Events => self.events.retain(|e| e.id != id),
                    Resource::Insights => self.insights.retain(|i| i.id != id),
                }
                self.clamp_selection();
                self.add_log(format!("✓ 已删除{} [{}]", resource.label(), id));
            }
            AppEvent::Uploaded(path) => {
                self.add_log(format!("✓ 上传成功: {}", path));
            }
        }
    }

    fn apply_auth(&mut self, state: AuthState) {
        let pending = self.pending_admin.take();
        self.auth = state.clone();
        match (state, pending) {
            (AuthState::Authenticated { .. }, Some(action)) => {
                self.admin_mode = true;
                self.run_admin_action(action);
            }
            (AuthState::Authenticated { .. }, None) => {}
            (_, Some(action)) => {
                // 守卫未通过：跳转登录页，登录后继续之前的操作
                self.admin_mode = false;
                self.pending_admin = Some(action);
                self.add_log("⚠ 需要管理员登录".to_string());
                self.open_login();
            }
            (_, None) => {
                let was_admin = std::mem::replace(&mut self.admin_mode, false);
                let editing = matches!(self.form.as_ref(), Some(f) if f.kind != FormKind::Login);
                if editing {
                    self.close_form();
                }
                if was_admin || editing {
                    // token 已失效：收起受保护内容，登录后重新进入管理面板
                    self.pending_admin = Some(AdminAction::Enter);
                    self.add_log("⚠ 登录已失效，请重新登录".to_string());
                    self.open_login();
                }
            }
        }
    }

    /// 获取当前的预测建议
    pub fn get_completion_hint(&self) -> Option<String> {
        let commands = [
            "login", "logout", "whoami", "admin", "refresh", "upload", "filter", "help", "quit",
        ];
        let input = self.command_input.trim();
        if input.is_empty() {
            return None;
        }
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.len() == 1 {
            for cmd in commands {
                if cmd.starts_with(parts[0]) && cmd != parts[0] {
                    return Some(cmd[parts[0].len()..].to_string());
                }
            }
        } else if parts[0] == "refresh" {
            let cur = parts.get(1).copied().unwrap_or("");
            for s in ["players", "events", "insights"] {
                if s.starts_with(cur) && s != cur {
                    return Some(s[cur.len()..].to_string());
                }
            }
        }
        None
    }

    fn finish_command(&mut self, cmd: String) {
        self.command_history.push(cmd);
        self.command_history_index = None;
        self.command_input.clear();
        self.command_cursor = 0;
        self.input_mode = InputMode::Normal;
    }

    /// 执行命令行输入，返回 true 表示退出
    fn run_command_line(&mut self, line: String) -> bool {
        let input = CommandInput::from_str(&line)
            .unwrap_or_else(|_| CommandInput::Invalid(format!("无法解析: {}", line)));
        self.finish_command(line);
        match input {
            CommandInput::Quit => return true,
            CommandInput::Admin => self.require_admin(AdminAction::Enter),
            CommandInput::Filter(query) => {
                if query.is_empty() {
                    self.filter_position = None;
                }
                self.filter_query = query;
                self.apply_filters();
            }
            CommandInput::Invalid(msg) => self.add_log(format!("✗ {}", msg)),
            CommandInput::Send(cmd) => {
                match &cmd {
                    AppCommand::Refresh(r) => {
                        self.loading.insert(*r);
                    }
                    AppCommand::RefreshAll => self.loading.extend(Resource::ALL),
                    _ => {}
                }
                self.send(cmd);
            }
        }
        false
    }

    fn handle_command_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Enter => {
                let cmd_owned = self.command_input.trim().to_string();
                if cmd_owned.is_empty() {
                    self.command_input.clear();
                    self.command_cursor = 0;
                    self.input_mode = InputMode::Normal;
                    return false;
                }
                return self.run_command_line(cmd_owned);
            }
            KeyCode::Esc => {
                self.command_input.clear();
                self.command_cursor = 0;
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Tab => {
                if let Some(hint) = self.get_completion_hint() {
                    let insert = format!("{} ", hint);
                    self.command_input.insert_str(self.command_cursor, &insert);
                    self.command_cursor += insert.len();
                }
            }
            KeyCode::Up => {
                if self.command_history.is_empty() {
                    return false;
                }
                let next = match self.command_history_index {
                    None => self.command_history.len() - 1,
                    Some(i) => i.saturating_sub(1),
                };
                self.command_history_index = Some(next);
                self.command_input = self.command_history[next].clone();
                self.command_cursor = self.command_input.len();
            }
            KeyCode::Down => {
                let Some(i) = self.command_history_index else {
                    return false;
                };
                if i + 1 >= self.command_history.len() {
                    self.command_history_index = None;
                    self.command_input.clear();
                    self.command_cursor = 0;
                } else {
                    self.command_history_index = Some(i + 1);
                    self.command_input = self.command_history[i + 1].clone();
                    self.command_cursor = self.command_input.len();
                }
            }
            KeyCode::Backspace => {
                if self.command_cursor > 0 {
                    let prev = prev_boundary(&self.command_input, self.command_cursor);
                    self.command_input.replace_range(prev..self.command_cursor, "");
                    self.command_cursor = prev;
                }
            }
            KeyCode::Left => {
                self.command_cursor = prev_boundary(&self.command_input, self.command_cursor);
            }
            KeyCode::Right => {
                self.command_cursor = next_boundary(&self.command_input, self.command_cursor);
            }
            KeyCode::Home => self.command_cursor = 0,
            KeyCode::End => self.command_cursor = self.command_input.len(),
            KeyCode::Char(c) => {
                self.command_input.insert(self.command_cursor, c);
                self.command_cursor += c.len_utf8();
            }
            _ => {}
        }
        false
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match key {
            KeyCode::Esc => {
                if form.kind == FormKind::Login {
                    self.pending_admin = None;
                }
                self.add_log("已取消编辑".to_string());
                self.close_form();
            }
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => form.select_next(),
            KeyCode::BackTab | KeyCode::Up => form.select_prev(),
            KeyCode::Left => form.cycle_choice(false),
            KeyCode::Right => form.cycle_choice(true),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Char(c) => {
                let on_choice = form
                    .fields
                    .get(form.selected)
                    .map(|f| matches!(f.kind, FieldKind::Choice(_)))
                    .unwrap_or(false);
                if on_choice && c == ' ' {
                    form.cycle_choice(true);
                } else {
                    form.push_char(c);
                }
            }
            _ => {}
        }
    }

    pub fn handle_key_event(&mut self, key: KeyCode) -> bool {
        if self.input_mode == InputMode::Command {
            return self.handle_command_key(key);
        }

        if self.view_mode == ViewMode::Form {
            self.handle_form_key(key);
            return false;
        }

        // 删除确认：y 确认，其他任意键取消
        if let Some(pending) = self.pending_delete.take() {
            if matches!(key, KeyCode::Char('y') | KeyCode::Char('Y')) {
                self.add_log(format!("正在删除{} \"{}\"...", pending.resource.label(), pending.label));
                self.send(AppCommand::Delete {
                    resource: pending.resource,
                    id: pending.id,
                });
            } else {
                self.add_log("已取消删除".to_string());
            }
            return false;
        }

        // 正常模式下的按键处理
        match key {
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Command;
                self.command_input.clear();
                self.command_cursor = 0;
            }
            KeyCode::Char('q') => return true,
            KeyCode::Left => self.focus_area = FocusArea::Menu,
            KeyCode::Right => self.focus_area = FocusArea::MainView,
            KeyCode::Up => {
                if self.focus_area == FocusArea::Menu {
                    self.menu_selected_index = self.menu_selected_index.saturating_sub(1);
                } else if self.view_mode == ViewMode::Detail {
                    self.detail_scroll = self.detail_scroll.saturating_sub(1);
                } else if self.selected_index > 0 {
                    self.selected_index -= 1;
                    self.list_state.select(Some(self.selected_index));
                }
            }
            KeyCode::Down => {
                if self.focus_area == FocusArea::Menu {
                    if self.menu_selected_index < MENU_ITEMS.len() - 1 {
                        self.menu_selected_index += 1;
                    }
                } else if self.view_mode == ViewMode::Detail {
                    self.detail_scroll = self.detail_scroll.saturating_add(1);
                } else if self.selected_index + 1 < self.list_len() {
                    self.selected_index += 1;
                    self.list_state.select(Some(self.selected_index));
                }
            }
            KeyCode::Enter | KeyCode::Char('c') => {
                if self.focus_area == FocusArea::Menu {
                    match self.menu_selected_index {
                        0 => self.show_list(Resource::Players),
                        1 => self.show_list(Resource::Events),
                        2 => self.show_list(Resource::Insights),
                        3 => self.require_admin(AdminAction::Enter),
                        _ => {}
                    }
                    self.focus_area = FocusArea::MainView;
                } else if self.current_resource().is_some() && self.list_len() > 0 {
                    self.request_detail();
                }
            }
            KeyCode::Char('x') => {
                if self.view_mode == ViewMode::Detail {
                    self.view_mode = self.return_view;
                    self.clamp_selection();
                }
            }
            KeyCode::Char('f') => {
                if self.view_mode == ViewMode::List(Resource::Players) {
                    self.cycle_position_filter();
                }
            }
            KeyCode::Char('r') => {
                if let Some(r) = self.current_resource() {
                    self.loading.insert(r);
                    self.send(AppCommand::Refresh(r));
                }
            }
            KeyCode::Char('l') => self.open_login(),
            KeyCode::Char('n') => {
                if self.current_resource().is_some() {
                    self.require_admin(AdminAction::New);
                }
            }
            KeyCode::Char('e') => {
                if self.current_resource().is_some() && self.list_len() > 0 {
                    self.require_admin(AdminAction::Edit);
                }
            }
            KeyCode::Char('d') => {
                if self.current_resource().is_some() && self.list_len() > 0 {
                    self.require_admin(AdminAction::Delete);
                }
            }
            _ => {}
        }
        false
    }
}

fn prev_boundary(s: &str, idx: usize) -> usize {
    s[..idx].char_indices().last().map(|(i, _)| i).unwrap_or(0)
}

fn next_boundary(s: &str, idx: usize) -> usize {
    s[idx..]
        .chars()
        .next()
        .map(|c| idx + c.len_utf8())
        .unwrap_or(idx)
}
