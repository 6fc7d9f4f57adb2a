pub mod auth;
pub mod teardown;

use envsweep_cloud_openstack::{OpenStackCli, OpenStackProvider, ProcessRunner};
use envsweep_config::Settings;

/// Provider built from settings; `cloud` from the command line wins over the file
pub fn build_provider(settings: &Settings, cloud: Option<String>) -> OpenStackProvider {
    let cloud = cloud.or_else(|| settings.provider.cloud.clone());
    OpenStackProvider::with_cli(OpenStackCli::with_runner(
        ProcessRunner,
        settings.provider.cli.clone(),
        cloud,
    ))
}
