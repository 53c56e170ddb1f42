use crate::app_state::{App, DetailItem, FocusArea, InputMode, ViewMode, MENU_ITEMS};
use crate::forms::{FieldKind, FormState};
use crate::guard::AuthState;
use crate::model::Resource;
use crate::session::image_url;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 顶部标题栏
            Constraint::Min(0),    // 中间内容区域
            Constraint::Min(8),    // 底部命令/日志区域
        ])
        .split(f.size());

    render_top_bar(f, chunks[0], app);

    let middle_chunks = Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(0)])
        .split(chunks[1]);

    render_left_menu(f, middle_chunks[0], app);
    render_main_view(f, middle_chunks[1], app);
    render_bottom_bar(f, chunks[2], app);
}

fn focus_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

fn label(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().add_modifier(Modifier::BOLD))
}

fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let auth = match &app.auth {
        AuthState::Authenticated { username } => Span::styled(
            format!(
                " 已登录: {}{} ",
                username.as_deref().unwrap_or("?"),
                if app.admin_mode { " [管理]" } else { "" }
            ),
            Style::default().fg(Color::Green),
        ),
        AuthState::Unauthenticated => Span::styled(" 未登录 ", Style::default().fg(Color::Yellow)),
        AuthState::Unknown => Span::styled(" 校验中... ", Style::default().fg(Color::Gray)),
    };

    let title_text = Line::from(vec![
        Span::styled(
            " 球员协会门户 ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" - "),
        Span::raw(app.api_url.as_str()),
        Span::raw("  "),
        auth,
    ]);

    let paragraph = Paragraph::new(title_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        )
        .alignment(ratatui::layout::Alignment::Center);

    f.render_widget(paragraph, area);
}

fn render_left_menu(f: &mut Frame, area: Rect, app: &App) {
    let menu_items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let is_selected = i == app.menu_selected_index;
            let is_active = match (i, &app.view_mode) {
                (0, ViewMode::List(Resource::Players)) => true,
                (1, ViewMode::List(Resource::Events)) => true,
                (2, ViewMode::List(Resource::Insights)) => true,
                (3, _) => app.admin_mode,
                _ => false,
            };

            let style = if is_selected && app.focus_area == FocusArea::Menu {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else if is_selected {
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };

            let prefix = if is_active { "● " } else { "○ " };
            ListItem::new(format!("{}{}", prefix, text)).style(style)
        })
        .collect();

    let title = if app.focus_area == FocusArea::Menu {
        "菜单 (Enter 确认)"
    } else {
        "菜单 (← 切换)"
    };

    let menu = List::new(menu_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(focus_style(app.focus_area == FocusArea::Menu)),
    );
    f.render_widget(menu, area);
}

fn list_title(app: &App, resource: Resource) -> String {
    let mut title = format!("{}列表 ({})", resource.label(), app.list_len());
    if app.loading.contains(&resource) {
        title.push_str(" 加载中...");
    }
    if resource == Resource::Players {
        let pos = app
            .filter_position
            .as_ref()
            .map(|p| p.as_str())
            .unwrap_or("全部");
        title.push_str(&format!(" [位置: {}]", pos));
        if !app.filter_query.is_empty() {
            title.push_str(&format!(" 搜索: \"{}\"", app.filter_query));
        }
    }
    if app.focus_area == FocusArea::MainView {
        title.push_str(if app.admin_mode {
            " (Enter 详情, n 新建, e 编辑, d 删除)"
        } else {
            " (Enter 详情, r 刷新, f 位置)"
        });
    }
    title
}

fn render_main_view(f: &mut Frame, area: Rect, app: &mut App) {
    match app.view_mode {
        ViewMode::List(resource) => {
            let rows: Vec<Line> = match resource {
                Resource::Players => app
                    .players
                    .iter()
                    .map(|p| {
                        Line::from(vec![
                            Span::styled(
                                format!("{:<11}", p.position.as_str()),
                                Style::default().fg(Color::Magenta),
                            ),
                            Span::raw(format!("{:<24}", p.full_name)),
                            Span::styled(format!("{:<20}", p.club), Style::default().fg(Color::Cyan)),
                            Span::raw(format!("{:>3} 岁  {}", p.age, p.nationality)),
                        ])
                    })
                    .collect(),
                Resource::Events => app
                    .events
                    .iter()
                    .map(|e| {
                        Line::from(vec![
                            Span::styled(
                                format!("{:<12}", e.date_label()),
                                Style::default().fg(Color::Yellow),
                            ),
                            Span::raw(format!("{:<32}", e.title)),
                            Span::styled(e.location.clone(), Style::default().fg(Color::Cyan)),
                        ])
                    })
                    .collect(),
                Resource::Insights => app
                    .insights
                    .iter()
                    .map(|i| {
                        Line::from(vec![
                            Span::styled(
                                format!("{:<10}", i.category.as_str()),
                                Style::default().fg(Color::Green),
                            ),
                            Span::raw(format!("{:<36}", i.title)),
                            Span::styled(i.author.clone(), Style::default().fg(Color::Gray)),
                        ])
                    })
                    .collect(),
            };
            let empty = rows.is_empty();
            let items: Vec<ListItem> = rows.into_iter().map(ListItem::new).collect();

            let block = Block::default()
                .borders(Borders::ALL)
                .title(list_title(app, resource))
                .style(focus_style(app.focus_area == FocusArea::MainView));

            if empty {
                let hint = if app.loading.contains(&resource) {
                    "正在加载..."
                } else {
                    "暂无数据"
                };
                f.render_widget(Paragraph::new(hint).block(block), area);
                return;
            }

            let list = List::new(items)
                .block(block)
                .highlight_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(">> ");
            app.list_state.select(Some(app.selected_index));
            f.render_stateful_widget(list, area, &mut app.list_state);
        }
        ViewMode::Detail => {
            let lines = match app.detail {
                Some(ref item) => detail_lines(item, &app.api_url),
                None => vec![Line::from("正在加载详情...")],
            };
            let title = if app.focus_area == FocusArea::MainView {
                "详细信息 (↑↓ 滚动, x 返回)"
            } else {
                "详细信息"
            };
            let paragraph = Paragraph::new(lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(title)
                        .style(focus_style(app.focus_area == FocusArea::MainView)),
                )
                .wrap(Wrap { trim: false })
                .scroll((app.detail_scroll, 0));
            f.render_widget(paragraph, area);
        }
        ViewMode::Form => {
            if let Some(ref form) = app.form {
                render_form(f, area, form);
            }
        }
    }
}

fn images_lines<'a>(images: &'a [String], api_url: &str) -> Vec<Line<'a>> {
    let mut lines = vec![Line::from(""), Line::from(label("图片:"))];
    if images.is_empty() {
        lines.push(Line::from("  (无)"));
    }
    for img in images {
        lines.push(Line::from(Span::styled(
            format!("  {}", image_url(api_url, img)),
            Style::default().fg(Color::Blue),
        )));
    }
    lines
}

fn detail_lines<'a>(item: &'a DetailItem, api_url: &str) -> Vec<Line<'a>> {
    match item {
        DetailItem::Player(p) => {
            let mut lines = vec![
                Line::from(vec![
                    label("姓名: "),
                    Span::styled(&p.full_name, Style::default().fg(Color::Cyan)),
                ]),
                Line::from(vec![label("年龄: "), Span::raw(p.age.to_string())]),
                Line::from(vec![label("俱乐部: "), Span::raw(&p.club)]),
                Line::from(vec![label("位置: "), Span::raw(p.position.as_str())]),
                Line::from(vec![label("国籍: "), Span::raw(&p.nationality)]),
                Line::from(""),
                Line::from(label("简介:")),
                Line::from(p.description.as_str()),
            ];
            lines.extend(images_lines(&p.images, api_url));
            lines
        }
        DetailItem::Event(e) => {
            let mut lines = vec![
                Line::from(vec![
                    label("标题: "),
                    Span::styled(&e.title, Style::default().fg(Color::Cyan)),
                ]),
                Line::from(vec![label("日期: "), Span::raw(e.date_label())]),
                Line::from(vec![label("地点: "), Span::raw(&e.location)]),
                Line::from(""),
                Line::from(label("描述:")),
            ];
            lines.extend(e.description.lines().map(Line::from));
            lines.extend(images_lines(&e.images, api_url));
            lines
        }
        DetailItem::Insight(i) => {
            let mut lines = vec![
                Line::from(vec![
                    label("标题: "),
                    Span::styled(&i.title, Style::default().fg(Color::Cyan)),
                ]),
                Line::from(vec![
                    label("作者: "),
                    Span::raw(&i.author),
                    Span::raw("  "),
                    label("分类: "),
                    Span::raw(i.category.as_str()),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    &i.short_description,
                    Style::default().add_modifier(Modifier::ITALIC),
                )),
                Line::from(""),
            ];
            lines.extend(i.content.lines().map(Line::from));
            lines.extend(images_lines(&i.images, api_url));
            lines
        }
    }
}

fn render_form(f: &mut Frame, area: Rect, form: &FormState) {
    let mut lines = Vec::new();
    for (idx, field) in form.fields.iter().enumerate() {
        let selected = idx == form.selected;
        let marker = if field.required { "*" } else { " " };
        let value = match field.kind {
            FieldKind::Choice(_) => format!("< {} >", field.value),
            _ if selected => format!("{}_", field.display_value()),
            _ => field.display_value(),
        };
        let style = if selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}{:<8}", marker, field.label), Style::default().fg(Color::Yellow)),
            Span::raw(" "),
            Span::styled(value, style),
        ]));
    }

    if !form.existing_images.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "已有图片 {} 张（保留）: {}",
            form.existing_images.len(),
            form.existing_images.join(", ")
        )));
    }

    lines.push(Line::from(""));
    if form.submitting {
        lines.push(Line::from(Span::styled(
            "正在提交...",
            Style::default().fg(Color::Cyan),
        )));
    }
    if let Some(ref err) = form.error {
        lines.push(Line::from(Span::styled(
            format!("✗ {}", err),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Tab/↑↓ 切换字段  ←→/空格 切换选项  Enter 提交  Esc 取消   (* 必填，图片用逗号分隔多个路径)",
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    )));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(form.title())
                .style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let bottom_chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let command_prompt = if app.input_mode == InputMode::Command {
        let mut spans = vec![Span::styled(
            "命令: ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )];
        let cur = app.command_cursor.min(app.command_input.len());
        let (left, right) = app.command_input.split_at(cur);
        spans.push(Span::raw(left));
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(right));
        if let Some(hint) = app.get_completion_hint() {
            spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
        }
        Line::from(spans)
    } else if let Some(ref pending) = app.pending_delete {
        Line::from(Span::styled(
            format!(
                "确认删除{} \"{}\"？ y 确认 / 其他键取消",
                pending.resource.label(),
                pending.label
            ),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(vec![
            Span::styled("命令: ", Style::default().fg(Color::Yellow)),
            Span::raw("/ 命令  l 登录  ←→ 切换  ↑↓ 导航  Enter 确认  x 返回  q 退出"),
        ])
    };
    let command_paragraph = Paragraph::new(command_prompt).block(
        Block::default()
            .borders(Borders::ALL)
            .title(if app.input_mode == InputMode::Command {
                "命令输入模式"
            } else {
                "命令输入"
            })
            .style(if app.input_mode == InputMode::Command {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            }),
    );
    f.render_widget(command_paragraph, bottom_chunks[0]);

    // 最新的日志在最上面
    let log_items: Vec<ListItem> = app
        .log_messages
        .iter()
        .rev()
        .take(20)
        .map(|msg| {
            let style = if msg.starts_with('✓') {
                Style::default().fg(Color::Green)
            } else if msg.starts_with('✗') {
                Style::default().fg(Color::Red)
            } else if msg.starts_with('⚠') {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(msg.as_str()).style(style)
        })
        .collect();

    let log = List::new(log_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("日志 (共 {} 条)", app.log_messages.len()))
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(log, bottom_chunks[1]);
}
