use crate::app_state::{AppEvent, DetailItem};
use crate::commands::{AppCommand, HELP_TEXT};
use crate::error::ApiError;
use crate::forms::FormOutput;
use crate::guard::{AuthState, SessionGuard, TokenStore};
use crate::model::Resource;
use crate::service::{auth, events, insights, players, upload};
use crate::session::ApiSession;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

/// 后台单任务：顺序处理 UI 发来的命令，结果以 AppEvent 回传
pub struct PortalService {
    session: Arc<ApiSession>,
    store: Arc<dyn TokenStore>,
    guard: SessionGuard,
    evt_tx: mpsc::UnboundedSender<AppEvent>,
}

impl PortalService {
    pub fn new(
        session: Arc<ApiSession>,
        store: Arc<dyn TokenStore>,
        evt_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let guard = SessionGuard::new(store.clone(), session.clone());
        Self {
            session,
            store,
            guard,
            evt_tx,
        }
    }

    fn emit(&self, evt: AppEvent) {
        let _ = self.evt_tx.send(evt);
    }

    /// 启动时把本地保存的 token 装进会话
    pub async fn restore_session(&self) -> Option<String> {
        match self.store.load_token().await {
            Ok(Some(token)) if !token.trim().is_empty() => {
                self.session.set_token(Some(token));
                let username = self.store.load_username().await.ok().flatten();
                let state = AuthState::Authenticated {
                    username: username.clone(),
                };
                self.emit(AppEvent::Auth(state));
                Some(username.unwrap_or_default())
            }
            Ok(_) => None,
            Err(e) => {
                warn!("读取本地凭据失败: {}", e);
                None
            }
        }
    }

    pub async fn run(self, mut cmd_rx: mpsc::UnboundedReceiver<AppCommand>) {
        while let Some(cmd) = cmd_rx.recv().await {
            self.handle(cmd).await;
        }
        info!("command channel closed, service loop exits");
    }

    pub async fn handle(&self, cmd: AppCommand) {
        match cmd {
            AppCommand::Refresh(resource) => self.refresh(resource).await,
            AppCommand::RefreshAll => refresh_catalog(&self.session, &self.evt_tx).await,
            AppCommand::GetDetail { resource, id } => self.detail(resource, &id).await,
            AppCommand::CheckSession { require_admin } => {
                let state = self.guard.check(require_admin).await;
                if !state.is_authenticated() {
                    self.session.set_token(None);
                }
                self.emit(AppEvent::Auth(state));
            }
            AppCommand::Login { username, password } => self.login(&username, &password).await,
            AppCommand::Logout => self.logout().await,
            AppCommand::WhoAmI => {
                let msg = match self.store.load_username().await {
                    Ok(Some(u)) if self.session.has_token() => format!("当前用户: {}", u),
                    _ => "未登录".to_string(),
                };
                self.emit(AppEvent::Message(msg));
            }
            AppCommand::Submit(output) => self.submit(output).await,
            AppCommand::Delete { resource, id } => self.delete(resource, &id).await,
            AppCommand::Upload { path } => match upload::upload_file(&self.session, &path).await {
                Ok(saved) => self.emit(AppEvent::Uploaded(saved)),
                Err(e) => self.report_failure("上传失败", e).await,
            },
            AppCommand::Help => self.emit(AppEvent::Message(HELP_TEXT.to_string())),
        }
    }

    async fn refresh(&self, resource: Resource) {
        refresh_one(&self.session, &self.evt_tx, resource).await;
    }

    async fn detail(&self, resource: Resource, id: &str) {
        let res = match resource {
            Resource::Players => players::get(&self.session, id).await.map(DetailItem::Player),
            Resource::Events => events::get(&self.session, id).await.map(DetailItem::Event),
            Resource::Insights => insights::get(&self.session, id)
                .await
                .map(DetailItem::Insight),
        };
        match res {
            Ok(item) => self.emit(AppEvent::Detail(item)),
            // 列表数据已作为占位显示，这里只记录
            Err(e) => {
                warn!("获取{}详情失败 [{}]: {}", resource.label(), id, e);
                self.emit(AppEvent::Log(format!("⚠ 详情未刷新: {}", e)));
            }
        }
    }

    async fn login(&self, username: &str, password: &str) {
        match auth::login(&self.session, username, password).await {
            Ok(resp) => {
                let name = resp
                    .username
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or_else(|| username.trim().to_string());
                if let Err(e) = self.store.save(&resp.token, &name).await {
                    error!("保存登录凭据失败: {}", e);
                    self.emit(AppEvent::Error(format!("✗ 保存登录凭据失败: {}", e)));
                }
                self.session.set_token(Some(resp.token));
                info!("logged in as {}", name);
                self.emit(AppEvent::LoggedIn { username: name });
            }
            Err(e) => {
                warn!("login failed: {}", e);
                self.emit(AppEvent::LoginFailed(e.to_string()));
            }
        }
    }

    async fn logout(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("清除本地凭据失败: {}", e);
        }
        self.session.set_token(None);
        self.emit(AppEvent::LoggedOut);
    }

    async fn submit(&self, output: FormOutput) {
        let (resource, res) = match output {
            FormOutput::Login { username, password } => {
                self.login(&username, &password).await;
                return;
            }
            FormOutput::CreatePlayer(d) => {
                (Resource::Players, players::create(&self.session, &d).await)
            }
            FormOutput::UpdatePlayer { id, draft } => (
                Resource::Players,
                players::update(&self.session, &id, &draft).await,
            ),
            FormOutput::CreateEvent(d) => (Resource::Events, events::create(&self.session, &d).await),
            FormOutput::UpdateEvent { id, draft } => (
                Resource::Events,
                events::update(&self.session, &id, &draft).await,
            ),
            FormOutput::CreateInsight(d) => (
                Resource::Insights,
                insights::create(&self.session, &d).await,
            ),
            FormOutput::UpdateInsight { id, draft } => (
                Resource::Insights,
                insights::update(&self.session, &id, &draft).await,
            ),
        };

        match res {
            Ok(()) => {
                self.emit(AppEvent::Saved { resource });
                self.refresh(resource).await;
            }
            Err(e) => {
                error!("保存{}失败: {}", resource.label(), e);
                self.emit(AppEvent::SaveFailed(e.to_string()));
                self.handle_unauthorized(&e).await;
            }
        }
    }

    async fn delete(&self, resource: Resource, id: &str) {
        let res = match resource {
            Resource::Players => players::delete(&self.session, id).await,
            Resource::Events => events::delete(&self.session, id).await,
            Resource::Insights => insights::delete(&self.session, id).await,
        };
        match res {
            Ok(()) => {
                self.emit(AppEvent::Deleted {
                    resource,
                    id: id.to_string(),
                });
                self.refresh(resource).await;
            }
            Err(e) => self.report_failure("删除失败", e).await,
        }
    }

    async fn report_failure(&self, what: &str, e: ApiError) {
        error!("{}: {}", what, e);
        self.emit(AppEvent::Error(format!("✗ {}: {}", what, e)));
        self.handle_unauthorized(&e).await;
    }

    /// 服务端拒绝 token：清掉本地凭据，UI 会跳转到登录页
    async fn handle_unauthorized(&self, e: &ApiError) {
        if matches!(e, ApiError::Unauthorized) {
            if let Err(err) = self.store.clear().await {
                warn!("清除本地凭据失败: {}", err);
            }
            self.session.set_token(None);
            self.emit(AppEvent::Auth(AuthState::Unauthenticated));
        }
    }
}

pub async fn refresh_one(
    session: &ApiSession,
    tx: &mpsc::UnboundedSender<AppEvent>,
    resource: Resource,
) {
    let evt = match resource {
        Resource::Players => players::list(session).await.map(AppEvent::Players),
        Resource::Events => events::list(session).await.map(AppEvent::Events),
        Resource::Insights => insights::list(session).await.map(AppEvent::Insights),
    };
    let evt = evt.unwrap_or_else(|e| {
        error!("加载{}失败: {}", resource.label(), e);
        AppEvent::LoadFailed {
            resource,
            message: e.to_string(),
        }
    });
    let _ = tx.send(evt);
}

/// 公共目录三张列表一起拉取
pub async fn refresh_catalog(session: &ApiSession, tx: &mpsc::UnboundedSender<AppEvent>) {
    futures::future::join3(
        refresh_one(session, tx, Resource::Players),
        refresh_one(session, tx, Resource::Events),
        refresh_one(session, tx, Resource::Insights),
    )
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::SqliteTokenStore;
    use crate::model::{PlayerDraft, Position};
    use crate::session::test_server::TestServer;
    use std::time::Duration;

    async fn service_at(
        base_url: &str,
    ) -> (
        PortalService,
        Arc<dyn TokenStore>,
        mpsc::UnboundedReceiver<AppEvent>,
    ) {
        let db = crate::storage::establish_connection("sqlite::memory:")
            .await
            .unwrap();
        let store: Arc<dyn TokenStore> = Arc::new(SqliteTokenStore::new(Arc::new(db)));
        let session = Arc::new(ApiSession::new(base_url, Duration::from_secs(5)).unwrap());
        let (tx, rx) = mpsc::unbounded_channel();
        (PortalService::new(session, store.clone(), tx), store, rx)
    }

    // 不可达地址：所有远程调用都会失败
    async fn service() -> (
        PortalService,
        Arc<dyn TokenStore>,
        mpsc::UnboundedReceiver<AppEvent>,
    ) {
        service_at("http://127.0.0.1:9/api").await
    }

    fn player_draft() -> PlayerDraft {
        PlayerDraft {
            full_name: "Ama Mensah".into(),
            age: 24,
            club: "Hearts of Oak".into(),
            position: Position::Forward,
            nationality: "Ghana".into(),
            description: String::new(),
            existing_images: vec!["uploads/ama.jpg".into()],
            new_images: vec![],
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
        let mut out = Vec::new();
        while let Ok(e) = rx.try_recv() {
            out.push(e);
        }
        out
    }

    #[tokio::test]
    async fn restore_loads_stored_token() {
        let (svc, store, mut rx) = service().await;
        assert_eq!(svc.restore_session().await, None);

        store.save("tok", "admin").await.unwrap();
        assert_eq!(svc.restore_session().await.as_deref(), Some("admin"));
        assert!(svc.session.has_token());
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [AppEvent::Auth(AuthState::Authenticated { .. })]
        ));
    }

    #[tokio::test]
    async fn unreachable_verify_clears_credentials() {
        let (svc, store, mut rx) = service().await;
        store.save("tok", "admin").await.unwrap();
        svc.restore_session().await;
        drain(&mut rx);

        svc.handle(AppCommand::CheckSession {
            require_admin: true,
        })
        .await;
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [AppEvent::Auth(AuthState::Unauthenticated)]
        ));
        assert_eq!(store.load_token().await.unwrap(), None);
        assert!(!svc.session.has_token());
    }

    #[tokio::test]
    async fn failed_list_reports_load_failure() {
        let (svc, _store, mut rx) = service().await;
        svc.handle(AppCommand::RefreshAll).await;
        let evts = drain(&mut rx);
        assert_eq!(evts.len(), 3);
        assert!(evts
            .iter()
            .all(|e| matches!(e, AppEvent::LoadFailed { .. })));
    }

    #[tokio::test]
    async fn logout_clears_store() {
        let (svc, store, mut rx) = service().await;
        store.save("tok", "admin").await.unwrap();
        svc.handle(AppCommand::Logout).await;
        assert!(matches!(drain(&mut rx).as_slice(), [AppEvent::LoggedOut]));
        assert_eq!(store.load_username().await.unwrap(), None);
    }

    #[tokio::test]
    async fn login_validation_happens_locally() {
        let (svc, _store, mut rx) = service().await;
        svc.handle(AppCommand::Login {
            username: " ".into(),
            password: "pw".into(),
        })
        .await;
        match drain(&mut rx).as_slice() {
            [AppEvent::LoginFailed(msg)] => assert!(msg.contains("不能为空")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_then_refetch_with_bearer() {
        let server = TestServer::start(&[
            ("POST", "/api/players", 201, r#"{"id":9}"#),
            ("GET", "/api/players", 200, r#"[{"id":9,"fullName":"Ama Mensah","age":24}]"#),
        ])
        .await;
        let (svc, _store, mut rx) = service_at(&server.base_url).await;
        svc.session.set_token(Some("tok".into()));

        svc.handle(AppCommand::Submit(FormOutput::CreatePlayer(player_draft())))
            .await;
        match drain(&mut rx).as_slice() {
            [AppEvent::Saved {
                resource: Resource::Players,
            }, AppEvent::Players(list)] => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].id, "9");
            }
            other => panic!("unexpected: {other:?}"),
        }

        let reqs = server.requests();
        assert_eq!(reqs.len(), 2);
        let post = &reqs[0];
        assert_eq!(post.method, "POST");
        assert_eq!(post.header("authorization"), Some("Bearer tok"));
        assert!(post
            .header("content-type")
            .unwrap_or("")
            .starts_with("multipart/form-data"));
        let body = post.body_text();
        assert!(body.contains("name=\"FullName\""));
        assert!(body.contains("Ama Mensah"));
        assert!(body.contains("name=\"ExistingImages\""));
        assert_eq!(reqs[1].method, "GET");
    }

    #[tokio::test]
    async fn update_uses_put_on_record_path() {
        let server = TestServer::start(&[
            ("PUT", "/api/players/7", 204, ""),
            ("GET", "/api/players", 200, "[]"),
        ])
        .await;
        let (svc, _store, mut rx) = service_at(&server.base_url).await;
        svc.session.set_token(Some("tok".into()));

        svc.handle(AppCommand::Submit(FormOutput::UpdatePlayer {
            id: "7".into(),
            draft: player_draft(),
        }))
        .await;
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [AppEvent::Saved { .. }, AppEvent::Players(list)] if list.is_empty()
        ));
        let reqs = server.requests();
        assert_eq!(reqs[0].method, "PUT");
        assert_eq!(reqs[0].header("authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn delete_then_refetch() {
        let server = TestServer::start(&[
            ("DELETE", "/api/events/3", 200, "{}"),
            ("GET", "/api/events", 200, r#"{"data":[{"id":4,"title":"Gala","date":"2025-07-04T18:00:00"}]}"#),
        ])
        .await;
        let (svc, _store, mut rx) = service_at(&server.base_url).await;
        svc.session.set_token(Some("tok".into()));

        svc.handle(AppCommand::Delete {
            resource: Resource::Events,
            id: "3".into(),
        })
        .await;
        match drain(&mut rx).as_slice() {
            [AppEvent::Deleted { resource, id }, AppEvent::Events(list)] => {
                assert_eq!(*resource, Resource::Events);
                assert_eq!(id, "3");
                assert_eq!(list[0].date_label(), "2025-07-04");
            }
            other => panic!("unexpected: {other:?}"),
        }
        let reqs = server.requests();
        assert_eq!(reqs[0].method, "DELETE");
        assert_eq!(reqs[0].header("authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn login_persists_token() {
        let server = TestServer::start(&[(
            "POST",
            "/api/auth/login",
            200,
            r#"{"token":"abc.def","username":"admin"}"#,
        )])
        .await;
        let (svc, store, mut rx) = service_at(&server.base_url).await;

        svc.handle(AppCommand::Login {
            username: "admin".into(),
            password: "secret".into(),
        })
        .await;
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [AppEvent::LoggedIn { username }] if username == "admin"
        ));
        assert_eq!(store.load_token().await.unwrap().as_deref(), Some("abc.def"));
        assert_eq!(svc.session.token().as_deref(), Some("abc.def"));

        let req = &server.requests()[0];
        assert!(req
            .header("content-type")
            .unwrap_or("")
            .starts_with("application/json"));
        assert!(req.body_text().contains(r#""password":"secret""#));
        assert_eq!(req.header("authorization"), None);
    }

    #[tokio::test]
    async fn rejected_save_clears_credentials() {
        let server = TestServer::start(&[(
            "POST",
            "/api/players",
            401,
            r#"{"message":"token expired"}"#,
        )])
        .await;
        let (svc, store, mut rx) = service_at(&server.base_url).await;
        store.save("stale", "admin").await.unwrap();
        svc.restore_session().await;
        drain(&mut rx);

        svc.handle(AppCommand::Submit(FormOutput::CreatePlayer(player_draft())))
            .await;
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [
                AppEvent::SaveFailed(_),
                AppEvent::Auth(AuthState::Unauthenticated)
            ]
        ));
        assert_eq!(store.load_token().await.unwrap(), None);
        assert!(!svc.session.has_token());
    }

    #[tokio::test]
    async fn verify_sends_stored_token() {
        let server = TestServer::start(&[("GET", "/api/auth/verify", 200, "{}")]).await;
        let (svc, store, mut rx) = service_at(&server.base_url).await;
        store.save("tok", "admin").await.unwrap();

        svc.handle(AppCommand::CheckSession {
            require_admin: true,
        })
        .await;
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [AppEvent::Auth(AuthState::Authenticated { username })] if username.as_deref() == Some("admin")
        ));
        assert_eq!(
            server.requests()[0].header("authorization"),
            Some("Bearer tok")
        );
    }

    #[tokio::test]
    async fn detail_decodes_record() {
        let server = TestServer::start(&[(
            "GET",
            "/api/insights/5",
            200,
            r#"{"id":5,"title":"Season review","category":null,"imageUrls":"a.png, b.png"}"#,
        )])
        .await;
        let (svc, _store, mut rx) = service_at(&server.base_url).await;

        svc.handle(AppCommand::GetDetail {
            resource: Resource::Insights,
            id: "5".into(),
        })
        .await;
        match drain(&mut rx).as_slice() {
            [AppEvent::Detail(DetailItem::Insight(i))] => {
                assert_eq!(i.title, "Season review");
                assert_eq!(i.images, vec!["a.png".to_string(), "b.png".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
