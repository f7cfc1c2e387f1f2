// Reverse-translation of a live inspect record into declarative forms:
// a compose-style service descriptor or an equivalent `docker run` command.
// Absent optional fields mean "omit", never failure.

use crate::models::{ComposeFile, ComposeService};
use bollard::models::ContainerInspectResponse;
use std::collections::BTreeMap;

/// Published ports as "host:container" strings. Port keys are sorted so the
/// output is stable; binding lists that are null or empty contribute nothing.
pub fn extract_port_mappings(inspect: &ContainerInspectResponse) -> Vec<String> {
    let Some(bindings) = inspect
        .host_config
        .as_ref()
        .and_then(|h| h.port_bindings.as_ref())
    else {
        return Vec::new();
    };
    let mut keys: Vec<&String> = bindings.keys().collect();
    keys.sort();
    let mut out = Vec::new();
    for key in keys {
        let container_port = key.split('/').next().unwrap_or(key);
        if let Some(Some(entries)) = bindings.get(key) {
            for binding in entries {
                if let Some(host_port) = &binding.host_port {
                    out.push(format!("{}:{}", host_port, container_port));
                }
            }
        }
    }
    out
}

fn stripped_name(inspect: &ContainerInspectResponse) -> String {
    inspect
        .name
        .as_deref()
        .unwrap_or_default()
        .trim_start_matches('/')
        .to_string()
}

fn image(inspect: &ContainerInspectResponse) -> String {
    inspect
        .config
        .as_ref()
        .and_then(|c| c.image.clone())
        .unwrap_or_default()
}

fn environment(inspect: &ContainerInspectResponse) -> Vec<String> {
    inspect
        .config
        .as_ref()
        .and_then(|c| c.env.clone())
        .unwrap_or_default()
}

fn binds(inspect: &ContainerInspectResponse) -> Vec<String> {
    inspect
        .host_config
        .as_ref()
        .and_then(|h| h.binds.clone())
        .unwrap_or_default()
}

fn restart_policy(inspect: &ContainerInspectResponse) -> Option<String> {
    inspect
        .host_config
        .as_ref()
        .and_then(|h| h.restart_policy.as_ref())
        .and_then(|p| p.name.as_ref())
        .map(|n| n.to_string())
        .filter(|n| !n.is_empty())
}

/// Compose document with the container as its single service. Optional keys
/// appear only when the container actually has the corresponding config.
pub fn build_compose_service(inspect: &ContainerInspectResponse) -> ComposeFile {
    let env = environment(inspect);
    let ports = extract_port_mappings(inspect);
    let volumes = binds(inspect);
    let service = ComposeService {
        image: image(inspect),
        environment: (!env.is_empty()).then_some(env),
        ports: (!ports.is_empty()).then_some(ports),
        volumes: (!volumes.is_empty()).then_some(volumes),
        restart: restart_policy(inspect),
    };
    let mut services = BTreeMap::new();
    services.insert(stripped_name(inspect), service);
    ComposeFile { services }
}

/// Multi-line `docker run` command equivalent to the inspected configuration.
pub fn build_run_command(inspect: &ContainerInspectResponse) -> String {
    let mut parts = vec![
        "docker run -d".to_string(),
        format!("--name {}", stripped_name(inspect)),
    ];
    if let Some(policy) = restart_policy(inspect) {
        parts.push(format!("--restart {}", policy));
    }
    for mapping in extract_port_mappings(inspect) {
        parts.push(format!("-p {}", mapping));
    }
    for bind in binds(inspect) {
        parts.push(format!("-v {}", bind));
    }
    for pair in environment(inspect) {
        parts.push(format!("-e {}", pair));
    }
    parts.push(image(inspect));
    parts.join(" \\\n  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_inspect() -> ContainerInspectResponse {
        serde_json::from_value(serde_json::json!({
            "Name": "/fullapp",
            "Config": { "Image": "nginx:latest", "Env": ["A=1"] },
            "HostConfig": {
                "PortBindings": { "80/tcp": [{ "HostPort": "8080" }] },
                "Binds": ["/data:/data"],
                "RestartPolicy": { "Name": "always" }
            }
        }))
        .expect("inspect fixture")
    }

    fn bare_inspect() -> ContainerInspectResponse {
        serde_json::from_value(serde_json::json!({
            "Name": "/bare",
            "Config": { "Image": "alpine:3" }
        }))
        .expect("inspect fixture")
    }

    #[test]
    fn port_mappings_strip_protocol_suffix() {
        assert_eq!(extract_port_mappings(&full_inspect()), vec!["8080:80"]);
    }

    #[test]
    fn port_mappings_empty_without_bindings() {
        assert!(extract_port_mappings(&bare_inspect()).is_empty());
        let nulled: ContainerInspectResponse = serde_json::from_value(serde_json::json!({
            "HostConfig": { "PortBindings": { "80/tcp": null, "443/tcp": [] } }
        }))
        .expect("inspect fixture");
        assert!(extract_port_mappings(&nulled).is_empty());
    }

    #[test]
    fn port_mappings_sorted_and_multi_binding() {
        let inspect: ContainerInspectResponse = serde_json::from_value(serde_json::json!({
            "HostConfig": { "PortBindings": {
                "80/tcp": [{ "HostPort": "8080" }, { "HostPort": "8081" }],
                "443/tcp": [{ "HostPort": "8443" }]
            } }
        }))
        .expect("inspect fixture");
        assert_eq!(
            extract_port_mappings(&inspect),
            vec!["8443:443", "8080:80", "8081:80"]
        );
    }

    #[test]
    fn compose_includes_only_populated_keys() {
        let file = build_compose_service(&full_inspect());
        let service = file.services.get("fullapp").expect("service present");
        assert_eq!(service.image, "nginx:latest");
        assert_eq!(service.environment.as_deref(), Some(&["A=1".to_string()][..]));
        assert_eq!(service.ports.as_deref(), Some(&["8080:80".to_string()][..]));
        assert_eq!(service.volumes.as_deref(), Some(&["/data:/data".to_string()][..]));
        assert_eq!(service.restart.as_deref(), Some("always"));
    }

    #[test]
    fn compose_omits_absent_optionals() {
        let file = build_compose_service(&bare_inspect());
        let json = serde_json::to_value(&file).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "services": { "bare": { "image": "alpine:3" } } })
        );
    }

    #[test]
    fn run_command_orders_flags() {
        let cmd = build_run_command(&full_inspect());
        let expected = [
            "docker run -d",
            "--name fullapp",
            "--restart always",
            "-p 8080:80",
            "-v /data:/data",
            "-e A=1",
            "nginx:latest",
        ];
        let mut cursor = 0;
        for part in expected {
            let at = cmd[cursor..].find(part).expect(part);
            cursor += at + part.len();
        }
        assert!(cmd.ends_with("nginx:latest"));
        assert!(cmd.contains(" \\\n  "));
    }

    #[test]
    fn run_command_minimal_container() {
        assert_eq!(
            build_run_command(&bare_inspect()),
            "docker run -d \\\n  --name bare \\\n  alpine:3"
        );
    }
}
