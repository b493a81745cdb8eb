//! Shared fakes and request helpers for the router tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{body::Body, http::{Request, Response}, Router};
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;
use venue_registry::{
    build_router,
    mailer::MailProvider,
    mailing::Mailing,
    models::{EmailTemplate, NewShow, RecipientList, Show, ShowPatch, TemplateInput},
    registry::ShowRegistry,
    services::{mailing::MailingRepository, shows::ShowRepository},
    storage::{AssetStore, LocalAssetStore, StoredAsset},
    AppState,
};

pub const BOUNDARY: &str = "XVENUEBOUNDARY";

#[derive(Default)]
pub struct FakeShows { rows: Mutex<Vec<Show>>, pub fail: Mutex<bool> }

impl FakeShows {
    fn check(&self) -> anyhow::Result<()> {
        if *self.fail.lock().unwrap() { anyhow::bail!("store unavailable"); }
        Ok(())
    }
    pub fn len(&self) -> usize { self.rows.lock().unwrap().len() }
}

#[async_trait]
impl ShowRepository for FakeShows {
    async fn insert(&self, id: Uuid, show: &NewShow, image: Option<&str>) -> anyhow::Result<Show> {
        self.check()?;
        let now = Utc::now();
        let rec = Show {
            id,
            title: show.title.clone(),
            date: show.date,
            time: show.time.clone(),
            description: show.description.clone(),
            image: image.map(str::to_string),
            ticket_link: show.ticket_link.clone(),
            location: show.location.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(rec.clone());
        Ok(rec)
    }

    async fn list(&self) -> anyhow::Result<Vec<Show>> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| (a.date, a.created_at, a.id).cmp(&(b.date, b.created_at, b.id)));
        Ok(rows)
    }

    async fn exists(&self, id: Uuid) -> anyhow::Result<bool> {
        self.check()?;
        Ok(self.rows.lock().unwrap().iter().any(|s| s.id == id))
    }

    async fn update(&self, id: Uuid, patch: &ShowPatch) -> anyhow::Result<Option<Show>> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let Some(s) = rows.iter_mut().find(|s| s.id == id) else { return Ok(None) };
        if let Some(v) = &patch.title { s.title = v.clone(); }
        if let Some(v) = patch.date { s.date = v; }
        if let Some(v) = &patch.time { s.time = v.clone(); }
        if let Some(v) = &patch.description { s.description = v.clone(); }
        if let Some(v) = &patch.ticket_link { s.ticket_link = v.clone(); }
        if let Some(v) = &patch.location { s.location = v.clone(); }
        if let Some(v) = &patch.image { s.image = Some(v.clone()); }
        s.updated_at = Utc::now();
        Ok(Some(s.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.id != id);
        Ok(rows.len() != before)
    }

    async fn ping(&self) -> anyhow::Result<()> { self.check() }
}

#[derive(Default)]
pub struct FakeMailing { templates: Mutex<Vec<EmailTemplate>>, lists: Mutex<Vec<RecipientList>> }

impl FakeMailing {
    pub fn template_count(&self) -> usize { self.templates.lock().unwrap().len() }
}

#[async_trait]
impl MailingRepository for FakeMailing {
    async fn upsert_template(&self, name: &str, input: &TemplateInput) -> anyhow::Result<EmailTemplate> {
        let tpl = EmailTemplate { name: name.into(), subject: input.subject.clone(), html: input.html.clone(), design: input.design.clone(), updated_at: Utc::now() };
        let mut all = self.templates.lock().unwrap();
        all.retain(|t| t.name != name);
        all.push(tpl.clone());
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tpl)
    }
    async fn list_templates(&self) -> anyhow::Result<Vec<EmailTemplate>> { Ok(self.templates.lock().unwrap().clone()) }
    async fn delete_template(&self, name: &str) -> anyhow::Result<bool> {
        let mut all = self.templates.lock().unwrap();
        let before = all.len();
        all.retain(|t| t.name != name);
        Ok(all.len() != before)
    }
    async fn upsert_list(&self, name: &str, emails: &[String]) -> anyhow::Result<RecipientList> {
        let list = RecipientList { name: name.into(), emails: emails.to_vec(), updated_at: Utc::now() };
        let mut all = self.lists.lock().unwrap();
        all.retain(|l| l.name != name);
        all.push(list.clone());
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }
    async fn get_list(&self, name: &str) -> anyhow::Result<Option<RecipientList>> {
        Ok(self.lists.lock().unwrap().iter().find(|l| l.name == name).cloned())
    }
    async fn list_lists(&self) -> anyhow::Result<Vec<RecipientList>> { Ok(self.lists.lock().unwrap().clone()) }
    async fn delete_list(&self, name: &str) -> anyhow::Result<bool> {
        let mut all = self.lists.lock().unwrap();
        let before = all.len();
        all.retain(|l| l.name != name);
        Ok(all.len() != before)
    }
}

/// Records every message; addresses listed in `reject` fail.
#[derive(Default)]
pub struct RecordingProvider { pub sent: Mutex<Vec<(String, String)>>, pub reject: Mutex<Vec<String>> }

#[async_trait]
impl MailProvider for RecordingProvider {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> anyhow::Result<()> {
        if self.reject.lock().unwrap().iter().any(|r| r == to) { anyhow::bail!("rejected {to}"); }
        self.sent.lock().unwrap().push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

/// Asset store whose writes always fail.
pub struct BrokenAssets;

#[async_trait]
impl AssetStore for BrokenAssets {
    async fn put(&self, _original_name: &str, _bytes: Bytes) -> anyhow::Result<StoredAsset> { anyhow::bail!("disk full") }
}

pub struct Harness {
    pub app: Router,
    pub shows: Arc<FakeShows>,
    pub mailing: Arc<FakeMailing>,
    pub provider: Arc<RecordingProvider>,
    pub upload_dir: tempfile::TempDir,
}

pub fn harness() -> Harness {
    let upload_dir = tempfile::tempdir().unwrap();
    let assets = Arc::new(LocalAssetStore::open(upload_dir.path()).unwrap());
    harness_with_assets(assets, upload_dir)
}

pub fn harness_with_assets(assets: Arc<dyn AssetStore>, upload_dir: tempfile::TempDir) -> Harness {
    let shows = Arc::new(FakeShows::default());
    let mailing = Arc::new(FakeMailing::default());
    let provider = Arc::new(RecordingProvider::default());
    let state = AppState {
        registry: ShowRegistry::new(shows.clone(), assets),
        mailing: Mailing::new(mailing.clone(), provider.clone(), 2),
        max_upload_bytes: 1024 * 1024,
    };
    Harness { app: build_router(state), shows, mailing, provider, upload_dir }
}

/// Build a multipart/form-data request body.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes());
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/jpeg\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(method: &str, uri: &str, fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
    Request::builder().method(method).uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(fields, file)))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder().method(method).uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(res: Response<Body>) -> Bytes {
    axum::body::to_bytes(res.into_body(), 16 * 1024 * 1024).await.unwrap()
}

pub async fn body_json(res: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(res).await).unwrap()
}
