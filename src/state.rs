use std::sync::Arc;
use std::time::Duration;

use crate::agora::RtcTokenBuilder;
use crate::config::AppConfig;
use crate::services::practitioner_service::PractitionerService;
use crate::services::profile_service::ProfileService;
use crate::services::session_service::SessionService;
use crate::supabase::{Database, Identity, Storage};

/// Everything a handler needs, constructed once in the entry point and
/// injected through the router. No module-scope singletons.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub identity: Identity,
    pub db: Database,
    pub storage: Storage,
    pub rtc: RtcTokenBuilder,
    pub profiles: ProfileService,
    pub practitioners: PractitionerService,
    pub sessions: SessionService,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::new();

        let identity = Identity::new(
            http.clone(),
            &config.supabase.url,
            &config.supabase.anon_key,
            &config.supabase.service_role_key,
        )?;
        let db = Database::new(
            http.clone(),
            &config.supabase.url,
            &config.supabase.service_role_key,
        )?;
        let storage = Storage::new(
            http,
            &config.supabase.url,
            &config.supabase.service_role_key,
            &config.supabase.avatar_bucket,
        )?;
        let rtc = RtcTokenBuilder::new(
            config.agora.app_id.clone(),
            &config.agora.app_certificate,
            Duration::from_secs(config.agora.token_ttl_secs),
        )?;

        let profiles = ProfileService::new(identity.clone(), db.clone());
        let practitioners = PractitionerService::new(db.clone());
        let sessions = SessionService::new(db.clone());

        Ok(Self {
            config: Arc::new(config),
            identity,
            db,
            storage,
            rtc,
            profiles,
            practitioners,
            sessions,
        })
    }
}
