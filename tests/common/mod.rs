//! Shared scaffolding for end-to-end orchestrator tests: stub target
//! inventories driven by tiny shell scripts, and a throwaway HTTP endpoint
//! that stands in for the server under test during readiness probing.

use cpv_bench::{CommandVariant, ResultPattern, Scenario, Taskset};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};

/// Lay down one stub target directory with the three collaborator scripts.
/// `run_script` is the body of `run.sh`.
pub fn stub_target(inventory: &Path, name: &str, run_script: &str) -> PathBuf {
    let dir = inventory.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("version.sh"), "echo '1.0.0'\n").unwrap();
    std::fs::write(dir.join("build.sh"), "exit 0\n").unwrap();
    std::fs::write(dir.join("run.sh"), run_script).unwrap();
    dir
}

/// A server script that forks a worker and then replaces itself, so both a
/// descendant and the root must be interrupted for teardown to complete
/// inside the test timeout.
pub const FORKING_SERVER: &str = "sleep 30 &\nexec sleep 30\n";

/// Stand-in for the target server's HTTP side: always answers 200 on an
/// OS-assigned port, for as long as the test process lives.
pub fn ready_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let mut stream = match stream {
                Ok(s) => s,
                Err(_) => break,
            };
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok"
            );
        }
    });
    format!("http://{}", addr)
}

/// A client script whose output varies per invocation: line N of `outputs`
/// on the Nth trial (the last line repeats afterwards). State lives in a
/// counter file next to the script.
pub fn trial_script(dir: &Path, outputs: &[&str]) -> PathBuf {
    let script = dir.join("trial.sh");
    let counter = dir.join("trial.count");
    let mut body = format!(
        "echo x >> \"{counter}\"\nn=$(wc -l < \"{counter}\" | tr -d ' ')\ncase \"$n\" in\n",
        counter = counter.display()
    );
    for (i, output) in outputs.iter().enumerate() {
        if i + 1 < outputs.len() {
            body.push_str(&format!("  {}) echo \"{}\";;\n", i + 1, output));
        } else {
            body.push_str(&format!("  *) echo \"{}\";;\n", output));
        }
    }
    body.push_str("esac\n");
    std::fs::write(&script, body).unwrap();
    script
}

/// One-variant scenario pointing at `url`, with the variant running the
/// given script through `sh`.
pub fn script_scenario(
    category: &str,
    url: &str,
    pattern: &str,
    greater_is_better: bool,
    script: &Path,
) -> Scenario {
    Scenario {
        category: category.to_string(),
        description: "stub scenario".to_string(),
        url: url.to_string(),
        variants: vec![CommandVariant::new(
            "stub client",
            "sh",
            &[script.to_str().unwrap()],
        )],
        pattern: ResultPattern::new(pattern).unwrap(),
        greater_is_better,
    }
}

/// Tests run unpinned so they do not depend on the `taskset` binary.
pub fn unpinned_tasksets() -> Vec<Taskset> {
    vec![Taskset::unpinned("unpinned")]
}
