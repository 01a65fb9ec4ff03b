// ABOUTME: One OpenSSH server container shared by every test in a binary.
// ABOUTME: Started on first use through bollard and force-removed at process exit.

use super::fixture_key;
use bollard::Docker;
use bollard::models::{ContainerCreateBody, HostConfig, PortBinding};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, RemoveContainerOptions, StartContainerOptions,
};
use futures::StreamExt;
use sftp_resource::sftp::ClientBuilder;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::io::AsyncReadExt;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const IMAGE: &str = "lscr.io/linuxserver/openssh-server:latest";
/// Port sshd listens on inside the image.
const CONTAINER_PORT: u16 = 2222;
const USER: &str = "testuser";

static CONTAINER_ID: OnceLock<String> = OnceLock::new();
static SERVER: tokio::sync::OnceCell<SshContainer> = tokio::sync::OnceCell::const_new();

#[ctor::dtor]
fn remove_container() {
    let Some(id) = CONTAINER_ID.get() else {
        return;
    };
    let Ok(runtime) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return;
    };
    runtime.block_on(async {
        let Ok(docker) = Docker::connect_with_local_defaults() else {
            return;
        };
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        let _ = docker.remove_container(id, Some(options)).await;
    });
}

pub async fn shared_container() -> &'static SshContainer {
    SERVER
        .get_or_init(|| async {
            SshContainer::start()
                .await
                .expect("failed to start SSH container")
        })
        .await
}

pub struct SshContainer {
    port: u16,
}

impl SshContainer {
    async fn start() -> Result<Self, BoxError> {
        let docker = Docker::connect_with_local_defaults()?;
        let public_key = std::fs::read_to_string(fixture_key().with_extension("pub"))?;

        let pull = CreateImageOptions {
            from_image: Some(IMAGE.to_string()),
            ..Default::default()
        };
        let mut progress = docker.create_image(Some(pull), None, None);
        while let Some(step) = progress.next().await {
            step?;
        }

        let port = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
            listener.local_addr()?.port()
        };
        let binding = PortBinding {
            host_ip: Some("127.0.0.1".to_string()),
            host_port: Some(port.to_string()),
        };
        let body = ContainerCreateBody {
            image: Some(IMAGE.to_string()),
            env: Some(vec![
                "PUID=1000".to_string(),
                "PGID=1000".to_string(),
                format!("USER_NAME={USER}"),
                format!("PUBLIC_KEY={}", public_key.trim()),
            ]),
            host_config: Some(HostConfig {
                port_bindings: Some(HashMap::from([(
                    format!("{CONTAINER_PORT}/tcp"),
                    Some(vec![binding]),
                )])),
                ..Default::default()
            }),
            ..Default::default()
        };
        let create = CreateContainerOptions {
            name: Some(format!("sftp-resource-test-{}", std::process::id())),
            ..Default::default()
        };

        let id = docker.create_container(Some(create), body).await?.id;
        let _ = CONTAINER_ID.set(id.clone());
        docker
            .start_container(&id, None::<StartContainerOptions>)
            .await?;

        await_banner(port).await?;
        Ok(Self { port })
    }

    /// Builder for this server: fixture key, scratch known_hosts, TOFU on.
    pub fn builder(&self) -> ClientBuilder {
        let known_hosts: PathBuf =
            std::env::temp_dir().join(format!("sftp-resource-known-hosts-{}", std::process::id()));
        ClientBuilder::new()
            .set_username(USER)
            .set_host("127.0.0.1")
            .set_port(self.port)
            .set_key_path(fixture_key())
            .set_known_hosts_path(known_hosts)
            .set_trust_on_first_use(true)
            .set_connect_timeout(Duration::from_secs(10))
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Poll until sshd sends its version line, for up to 30 seconds.
async fn await_banner(port: u16) -> Result<(), BoxError> {
    for _ in 0..60 {
        if let Ok(mut stream) = tokio::net::TcpStream::connect(("127.0.0.1", port)).await {
            let mut banner = [0u8; 4];
            let read = tokio::time::timeout(Duration::from_secs(2), stream.read_exact(&mut banner));
            if matches!(read.await, Ok(Ok(_))) && &banner == b"SSH-" {
                // sshd answers before the user account is provisioned
                tokio::time::sleep(Duration::from_millis(500)).await;
                return Ok(());
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    Err(format!("no SSH banner on port {port}").into())
}
