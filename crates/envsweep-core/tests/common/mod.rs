use async_trait::async_trait;
use envsweep_cloud::{
    AuthStatus, CloudError, CloudProvider, FloatingIp, Instance, NetworkingMode, Result, Volume,
    VolumeStatus,
};
use envsweep_core::{GuestDeregistrar, GuestError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

pub type CallLog = Arc<Mutex<Vec<String>>>;

/// In-memory provider that records every call
pub struct FakeProvider {
    instances: Vec<Instance>,
    volumes: Vec<Volume>,
    floating_ips: Vec<FloatingIp>,
    networking: NetworkingMode,
    volume_states: Mutex<HashMap<String, VecDeque<VolumeStatus>>>,
    failing: HashSet<String>,
    unreachable: bool,
    floating_ip_listing_fails: bool,
    log: CallLog,
}

#[allow(dead_code)]
impl FakeProvider {
    pub fn new() -> Self {
        Self {
            instances: Vec::new(),
            volumes: Vec::new(),
            floating_ips: Vec::new(),
            networking: NetworkingMode::Advanced,
            volume_states: Mutex::new(HashMap::new()),
            failing: HashSet::new(),
            unreachable: false,
            floating_ip_listing_fails: false,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The listing hides the image; only `show_instance` returns it.
    pub fn instance(mut self, instance: Instance) -> Self {
        self.instances.push(instance);
        self
    }

    /// `count` instances named `<prefix>-<n>` built from `image`
    pub fn instances(mut self, prefix: &str, count: usize, image: &str) -> Self {
        for n in 0..count {
            self.instances.push(
                Instance::new(format!("{}-id-{}", prefix, n), format!("{}-{}", prefix, n))
                    .with_image(image),
            );
        }
        self
    }

    pub fn volume(mut self, volume: Volume) -> Self {
        self.volumes.push(volume);
        self
    }

    pub fn floating_ip(mut self, fip: FloatingIp) -> Self {
        self.floating_ips.push(fip);
        self
    }

    pub fn networking(mut self, mode: NetworkingMode) -> Self {
        self.networking = mode;
        self
    }

    /// Statuses returned by successive `show_volume` calls; the last one repeats
    pub fn volume_states(self, id: &str, states: &[VolumeStatus]) -> Self {
        self.volume_states
            .lock()
            .unwrap()
            .insert(id.to_string(), states.iter().cloned().collect());
        self
    }

    /// Deleting this ID fails
    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// `list_floating_ips` fails while the networking probe still succeeds
    pub fn floating_ip_listing_fails(mut self) -> Self {
        self.floating_ip_listing_fails = true;
        self
    }

    pub fn log(&self) -> CallLog {
        Arc::clone(&self.log)
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split(' ').next() == Some(method))
            .collect()
    }

    /// Calls that change provider state
    pub fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("delete_") || c.starts_with("release_"))
            .collect()
    }

    fn record(&self, call: String) {
        self.log.lock().unwrap().push(call);
    }

    fn delete(&self, method: &str, id: &str) -> Result<()> {
        self.record(format!("{} {}", method, id));
        if self.failing.contains(id) {
            return Err(CloudError::ApiError(format!("{} is locked", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl CloudProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn display_name(&self) -> &str {
        "Fake"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        self.record("check_auth".to_string());
        Ok(AuthStatus::ok("fake project"))
    }

    async fn list_instances(&self) -> Result<Vec<Instance>> {
        self.record("list_instances".to_string());
        if self.unreachable {
            return Err(CloudError::Unreachable("connection refused".to_string()));
        }
        Ok(self
            .instances
            .iter()
            .cloned()
            .map(|mut i| {
                i.image = None;
                i
            })
            .collect())
    }

    async fn show_instance(&self, id: &str) -> Result<Instance> {
        self.record(format!("show_instance {}", id));
        self.instances
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| CloudError::ResourceNotFound(id.to_string()))
    }

    async fn list_volumes(&self) -> Result<Vec<Volume>> {
        self.record("list_volumes".to_string());
        if self.unreachable {
            return Err(CloudError::Unreachable("connection refused".to_string()));
        }
        Ok(self.volumes.clone())
    }

    async fn show_volume(&self, id: &str) -> Result<Volume> {
        self.record(format!("show_volume {}", id));
        let mut volume = self
            .volumes
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| CloudError::ResourceNotFound(id.to_string()))?;

        let mut states = self.volume_states.lock().unwrap();
        if let Some(queue) = states.get_mut(id) {
            let status = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            if let Some(status) = status {
                volume.status = status;
            }
        }
        Ok(volume)
    }

    async fn probe_networking(&self) -> NetworkingMode {
        self.record("probe_networking".to_string());
        self.networking
    }

    async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>> {
        self.record("list_floating_ips".to_string());
        if self.floating_ip_listing_fails {
            return Err(CloudError::ApiError(
                "HTTP 503: networking service unavailable".to_string(),
            ));
        }
        Ok(self.floating_ips.clone())
    }

    async fn delete_instance(&self, id: &str) -> Result<()> {
        self.delete("delete_instance", id)
    }

    async fn delete_volume(&self, id: &str) -> Result<()> {
        self.delete("delete_volume", id)
    }

    async fn release_floating_ip(&self, id: &str) -> Result<()> {
        self.delete("release_floating_ip", id)
    }
}

/// Guest deregistrar writing into a provider's call log
pub struct FakeDeregistrar {
    log: CallLog,
    failing: HashSet<String>,
}

#[allow(dead_code)]
impl FakeDeregistrar {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            failing: HashSet::new(),
        }
    }

    pub fn failing(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }
}

#[async_trait]
impl GuestDeregistrar for FakeDeregistrar {
    async fn deregister(&self, address: &str) -> std::result::Result<(), GuestError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("deregister {}", address));
        if self.failing.contains(address) {
            return Err(GuestError::CommandFailed {
                address: address.to_string(),
                status: "exit status: 255".to_string(),
                stderr: "Connection timed out".to_string(),
            });
        }
        Ok(())
    }
}
