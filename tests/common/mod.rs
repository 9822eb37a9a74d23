use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Cargo builds the binary before integration tests run
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tally-api"));
        cmd.env("TALLY_API_PORT", port.to_string())
            .env("JWT_SECRET", TEST_JWT_SECRET)
            // Keep the sweep loop out of the way during tests
            .env("JOBS_OVERDUE_SWEEP_ENABLED", "false")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit the environment so DATABASE_URL from .env or CI is visible
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            // /ping never touches the database, so it answers as soon as the
            // router is up
            match client.get(format!("{}/ping", self.base_url)).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => {}
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Mint a token the spawned server will accept. The secret must be in the
/// environment before the config singleton is first read in this process.
#[allow(dead_code)]
pub fn mint_token() -> String {
    std::env::set_var("JWT_SECRET", TEST_JWT_SECRET);

    let claims = tally_api::auth::Claims::new(
        uuid::Uuid::new_v4(),
        "tester@example.com".to_string(),
        tally_api::database::models::UserRole::User,
    );

    tally_api::auth::generate_jwt(&claims).expect("failed to mint test token")
}
