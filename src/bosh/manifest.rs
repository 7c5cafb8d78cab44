//! `bosh-init` deployment manifest for a single AWS director VM

use super::credentials::Credentials;
use crate::error::Result;
use crate::traits::DeployInput;
use serde::Serialize;

pub const MANIFEST_FILE_NAME: &str = "bosh.yml";
pub const PRIVATE_KEY_FILE_NAME: &str = "bosh.pem";

const DIRECTOR_INTERNAL_IP: &str = "10.0.0.6";
const SUBNET_RANGE: &str = "10.0.0.0/24";
const SUBNET_GATEWAY: &str = "10.0.0.1";
const SUBNET_DNS: &str = "10.0.0.2";
const INSTANCE_TYPE: &str = "m3.xlarge";
const EPHEMERAL_DISK_SIZE: u32 = 25_000;
const PERSISTENT_DISK_SIZE: u32 = 20_000;
const DISK_TYPE: &str = "gp2";
const AGENT_PORT: u16 = 6868;
const DIRECTOR_PORT: u16 = 25555;

const BOSH_RELEASE_URL: &str = "https://bosh.io/d/github.com/cloudfoundry/bosh?v=255.8";
const AWS_CPI_RELEASE_URL: &str =
    "https://bosh.io/d/github.com/cloudfoundry-incubator/bosh-aws-cpi-release?v=52";
const STEMCELL_URL: &str =
    "https://bosh.io/d/stemcells/bosh-aws-xen-hvm-ubuntu-trusty-go_agent?v=3012";

#[derive(Debug, Serialize)]
pub struct Manifest {
    pub name: String,
    pub releases: Vec<Release>,
    pub resource_pools: Vec<ResourcePool>,
    pub disk_pools: Vec<DiskPool>,
    pub networks: Vec<Network>,
    pub jobs: Vec<Job>,
    pub cloud_provider: CloudProvider,
}

#[derive(Debug, Serialize)]
pub struct Release {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ResourcePool {
    pub name: String,
    pub network: String,
    pub stemcell: Stemcell,
    pub cloud_properties: ResourcePoolCloudProperties,
}

#[derive(Debug, Serialize)]
pub struct Stemcell {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ResourcePoolCloudProperties {
    pub instance_type: String,
    pub ephemeral_disk: Disk,
    pub availability_zone: String,
}

#[derive(Debug, Serialize)]
pub struct Disk {
    pub size: u32,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct DiskPool {
    pub name: String,
    pub disk_size: u32,
    pub cloud_properties: DiskCloudProperties,
}

#[derive(Debug, Serialize)]
pub struct DiskCloudProperties {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct Network {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<Subnet>,
}

#[derive(Debug, Serialize)]
pub struct Subnet {
    pub range: String,
    pub gateway: String,
    pub dns: Vec<String>,
    pub cloud_properties: SubnetCloudProperties,
}

#[derive(Debug, Serialize)]
pub struct SubnetCloudProperties {
    pub subnet: String,
}

#[derive(Debug, Serialize)]
pub struct Job {
    pub name: String,
    pub instances: u32,
    pub resource_pool: String,
    pub persistent_disk_pool: String,
    pub templates: Vec<Template>,
    pub networks: Vec<JobNetwork>,
    pub properties: JobProperties,
}

#[derive(Debug, Serialize)]
pub struct Template {
    pub name: String,
    pub release: String,
}

#[derive(Debug, Serialize)]
pub struct JobNetwork {
    pub name: String,
    pub static_ips: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub default: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JobProperties {
    pub nats: UserEndpoint,
    pub postgres: Postgres,
    pub registry: Registry,
    pub blobstore: Blobstore,
    pub director: Director,
    pub hm: HealthMonitor,
    pub agent: Agent,
    pub aws: AwsProperties,
    pub ntp: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UserEndpoint {
    pub address: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Postgres {
    pub listen_address: String,
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub adapter: String,
}

#[derive(Debug, Serialize)]
pub struct Registry {
    pub address: String,
    pub host: String,
    pub db: Postgres,
    pub http: RegistryHttp,
    pub username: String,
    pub password: String,
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub struct RegistryHttp {
    pub user: String,
    pub password: String,
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub struct Blobstore {
    pub address: String,
    pub port: u16,
    pub provider: String,
    pub director: Credential,
    pub agent: Credential,
}

#[derive(Debug, Serialize)]
pub struct Credential {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Director {
    pub address: String,
    pub name: String,
    pub db: Postgres,
    pub cpi_job: String,
    pub max_threads: u32,
    pub user_management: UserManagement,
    pub ssl: Ssl,
}

#[derive(Debug, Serialize)]
pub struct UserManagement {
    pub provider: String,
    pub local: LocalUsers,
}

#[derive(Debug, Serialize)]
pub struct LocalUsers {
    pub users: Vec<LocalUser>,
}

#[derive(Debug, Serialize)]
pub struct LocalUser {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Ssl {
    pub cert: String,
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct HealthMonitor {
    pub director_account: Credential,
    pub resurrector_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct Agent {
    pub mbus: String,
}

#[derive(Debug, Serialize)]
pub struct AwsProperties {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub default_key_name: String,
    pub default_security_groups: Vec<String>,
    pub region: String,
}

#[derive(Debug, Serialize)]
pub struct CloudProvider {
    pub template: Template,
    pub ssh_tunnel: SshTunnel,
    pub mbus: String,
    pub properties: CloudProviderProperties,
}

#[derive(Debug, Serialize)]
pub struct SshTunnel {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub private_key: String,
}

#[derive(Debug, Serialize)]
pub struct CloudProviderProperties {
    pub aws: AwsProperties,
    pub agent: Agent,
    pub blobstore: LocalBlobstore,
    pub ntp: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LocalBlobstore {
    pub provider: String,
    pub path: String,
}

fn named(name: &str, release: &str) -> Template {
    Template {
        name: name.to_string(),
        release: release.to_string(),
    }
}

fn ntp_servers() -> Vec<String> {
    ["0.pool.ntp.org", "1.pool.ntp.org"]
        .iter()
        .map(|server| server.to_string())
        .collect()
}

fn director_database(credentials: &Credentials, database: &str) -> Postgres {
    Postgres {
        listen_address: "127.0.0.1".to_string(),
        host: "127.0.0.1".to_string(),
        user: credentials.postgres_username.clone(),
        password: credentials.postgres_password.clone(),
        database: database.to_string(),
        adapter: "postgres".to_string(),
    }
}

fn aws_properties(input: &DeployInput) -> AwsProperties {
    AwsProperties {
        access_key_id: input.infrastructure.access_key_id.clone(),
        secret_access_key: input.infrastructure.secret_access_key.clone(),
        default_key_name: input.key_pair.name.clone(),
        default_security_groups: vec![input.infrastructure.security_group.clone()],
        region: input.region.clone(),
    }
}

impl Manifest {
    pub fn build(input: &DeployInput, credentials: &Credentials) -> Self {
        let infrastructure = &input.infrastructure;
        let mbus = |host: &str| {
            format!(
                "https://{}:{}@{}:{}",
                credentials.mbus_username, credentials.mbus_password, host, AGENT_PORT
            )
        };

        Manifest {
            name: "bosh".to_string(),
            releases: vec![
                Release {
                    name: "bosh".to_string(),
                    url: BOSH_RELEASE_URL.to_string(),
                },
                Release {
                    name: "bosh-aws-cpi".to_string(),
                    url: AWS_CPI_RELEASE_URL.to_string(),
                },
            ],
            resource_pools: vec![ResourcePool {
                name: "vms".to_string(),
                network: "private".to_string(),
                stemcell: Stemcell {
                    url: STEMCELL_URL.to_string(),
                },
                cloud_properties: ResourcePoolCloudProperties {
                    instance_type: INSTANCE_TYPE.to_string(),
                    ephemeral_disk: Disk {
                        size: EPHEMERAL_DISK_SIZE,
                        kind: DISK_TYPE.to_string(),
                    },
                    availability_zone: infrastructure.availability_zone.clone(),
                },
            }],
            disk_pools: vec![DiskPool {
                name: "disks".to_string(),
                disk_size: PERSISTENT_DISK_SIZE,
                cloud_properties: DiskCloudProperties {
                    kind: DISK_TYPE.to_string(),
                },
            }],
            networks: vec![
                Network {
                    name: "private".to_string(),
                    kind: "manual".to_string(),
                    subnets: vec![Subnet {
                        range: SUBNET_RANGE.to_string(),
                        gateway: SUBNET_GATEWAY.to_string(),
                        dns: vec![SUBNET_DNS.to_string()],
                        cloud_properties: SubnetCloudProperties {
                            subnet: infrastructure.subnet_id.clone(),
                        },
                    }],
                },
                Network {
                    name: "public".to_string(),
                    kind: "vip".to_string(),
                    subnets: Vec::new(),
                },
            ],
            jobs: vec![Job {
                name: "bosh".to_string(),
                instances: 1,
                resource_pool: "vms".to_string(),
                persistent_disk_pool: "disks".to_string(),
                templates: vec![
                    named("nats", "bosh"),
                    named("postgres", "bosh"),
                    named("blobstore", "bosh"),
                    named("director", "bosh"),
                    named("health_monitor", "bosh"),
                    named("registry", "bosh"),
                    named("aws_cpi", "bosh-aws-cpi"),
                ],
                networks: vec![
                    JobNetwork {
                        name: "private".to_string(),
                        static_ips: vec![DIRECTOR_INTERNAL_IP.to_string()],
                        default: vec!["dns".to_string(), "gateway".to_string()],
                    },
                    JobNetwork {
                        name: "public".to_string(),
                        static_ips: vec![infrastructure.elastic_ip.clone()],
                        default: Vec::new(),
                    },
                ],
                properties: JobProperties {
                    nats: UserEndpoint {
                        address: "127.0.0.1".to_string(),
                        user: credentials.nats_username.clone(),
                        password: credentials.nats_password.clone(),
                    },
                    postgres: director_database(credentials, "bosh"),
                    registry: Registry {
                        address: DIRECTOR_INTERNAL_IP.to_string(),
                        host: DIRECTOR_INTERNAL_IP.to_string(),
                        db: director_database(credentials, "bosh"),
                        http: RegistryHttp {
                            user: credentials.registry_username.clone(),
                            password: credentials.registry_password.clone(),
                            port: 25777,
                        },
                        username: credentials.registry_username.clone(),
                        password: credentials.registry_password.clone(),
                        port: 25777,
                    },
                    blobstore: Blobstore {
                        address: DIRECTOR_INTERNAL_IP.to_string(),
                        port: 25250,
                        provider: "dav".to_string(),
                        director: Credential {
                            user: credentials.blobstore_director_username.clone(),
                            password: credentials.blobstore_director_password.clone(),
                        },
                        agent: Credential {
                            user: credentials.blobstore_agent_username.clone(),
                            password: credentials.blobstore_agent_password.clone(),
                        },
                    },
                    director: Director {
                        address: "127.0.0.1".to_string(),
                        name: input.director_name.clone(),
                        db: director_database(credentials, "bosh"),
                        cpi_job: "aws_cpi".to_string(),
                        max_threads: 10,
                        user_management: UserManagement {
                            provider: "local".to_string(),
                            local: LocalUsers {
                                users: vec![
                                    LocalUser {
                                        name: input.director_username.clone(),
                                        password: input.director_password.clone(),
                                    },
                                    LocalUser {
                                        name: credentials.hm_username.clone(),
                                        password: credentials.hm_password.clone(),
                                    },
                                ],
                            },
                        },
                        ssl: Ssl {
                            cert: input.ssl_key_pair.certificate.clone(),
                            key: input.ssl_key_pair.private_key.clone(),
                        },
                    },
                    hm: HealthMonitor {
                        director_account: Credential {
                            user: credentials.hm_username.clone(),
                            password: credentials.hm_password.clone(),
                        },
                        resurrector_enabled: true,
                    },
                    agent: Agent {
                        mbus: format!(
                            "nats://{}:{}@{}:4222",
                            credentials.nats_username,
                            credentials.nats_password,
                            DIRECTOR_INTERNAL_IP
                        ),
                    },
                    aws: aws_properties(input),
                    ntp: ntp_servers(),
                },
            }],
            cloud_provider: CloudProvider {
                template: named("aws_cpi", "bosh-aws-cpi"),
                ssh_tunnel: SshTunnel {
                    host: infrastructure.elastic_ip.clone(),
                    port: 22,
                    user: "vcap".to_string(),
                    private_key: format!("./{}", PRIVATE_KEY_FILE_NAME),
                },
                mbus: mbus(&infrastructure.elastic_ip),
                properties: CloudProviderProperties {
                    aws: aws_properties(input),
                    agent: Agent {
                        mbus: mbus("0.0.0.0"),
                    },
                    blobstore: LocalBlobstore {
                        provider: "local".to_string(),
                        path: "/var/vcap/micro_bosh/data/cache".to_string(),
                    },
                    ntp: ntp_servers(),
                },
            },
        }
    }
}

/// Render the manifest as YAML
pub fn render(input: &DeployInput, credentials: &Credentials) -> Result<String> {
    Ok(serde_yml::to_string(&Manifest::build(input, credentials))?)
}

/// Address operators reach the director at
pub fn director_url(elastic_ip: &str) -> String {
    format!("https://{}:{}", elastic_ip, DIRECTOR_PORT)
}

#[cfg(test)]
mod tests;
