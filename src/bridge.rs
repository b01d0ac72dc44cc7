use crate::legality::{ProposedSet, Validator};
use crate::model::{FormatRules, TeamMember};
use crate::pool::TeamGenerator;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Mutex;

/// One reply line from the bridge script. Exactly one of the payload fields
/// is set depending on the request op; `error` reports a failure inside the
/// simulator.
#[derive(Debug, Deserialize)]
struct BridgeReply {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    problems: Option<Vec<String>>,
    #[serde(default)]
    team: Option<Vec<TeamMember>>,
    #[serde(default)]
    rules: Option<FormatRules>,
}

struct BridgeIo {
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Long-lived `node tools/sim_bridge.js` subprocess speaking line-delimited
/// JSON. One request line in, one reply line out; requests are serialized
/// behind a mutex so the validator side can be shared across threads.
pub struct ShowdownBridge {
    child: Child,
    io: Mutex<BridgeIo>,
}

impl ShowdownBridge {
    /// Spawns the bridge. `format` fixes the format the validator side
    /// judges against; generation requests name their format per call.
    pub fn spawn(script: &Path, showdown_dir: &Path, format: &str) -> Result<Self> {
        let mut child = Command::new("node")
            .arg(script)
            .arg(showdown_dir)
            .arg(format)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| {
                format!(
                    "Failed to start simulator bridge {} (is node installed?)",
                    script.display()
                )
            })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("Bridge stdin was not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("Bridge stdout was not captured"))?;
        Ok(Self {
            child,
            io: Mutex::new(BridgeIo {
                stdin,
                stdout: BufReader::new(stdout),
            }),
        })
    }

    pub fn format_rules(&self, format: &str) -> Result<FormatRules> {
        let reply = self
            .request(json!({ "op": "rules", "format": format }))
            .with_context(|| format!("Failed to fetch rules for format '{format}'"))?;
        reply
            .rules
            .ok_or_else(|| anyhow!("Bridge reply for 'rules' carried no rules payload"))
    }

    fn request(&self, payload: serde_json::Value) -> Result<BridgeReply> {
        let mut io = self
            .io
            .lock()
            .map_err(|_| anyhow!("Bridge lock poisoned by an earlier panic"))?;
        let line = serde_json::to_string(&payload).context("Failed to encode bridge request")?;
        io.stdin
            .write_all(line.as_bytes())
            .and_then(|_| io.stdin.write_all(b"\n"))
            .and_then(|_| io.stdin.flush())
            .context("Failed to write to the bridge; did the node process exit?")?;

        let mut reply_line = String::new();
        let read = io
            .stdout
            .read_line(&mut reply_line)
            .context("Failed to read from the bridge")?;
        if read == 0 {
            bail!("Bridge closed its pipe mid-run");
        }
        let reply: BridgeReply = serde_json::from_str(reply_line.trim())
            .with_context(|| format!("Malformed bridge reply: {}", reply_line.trim()))?;
        if let Some(error) = reply.error {
            bail!("Simulator error: {error}");
        }
        Ok(reply)
    }
}

impl Validator for ShowdownBridge {
    fn validate(&self, set: &ProposedSet) -> Result<Vec<String>> {
        let reply = self
            .request(json!({
                "op": "validate",
                "species": set.species,
                "ability": set.ability,
                "moves": set.moves,
                "level": set.level,
            }))
            .with_context(|| format!("Validator fault while checking '{}'", set.species))?;
        Ok(reply.problems.unwrap_or_default())
    }
}

impl TeamGenerator for ShowdownBridge {
    fn generate(&mut self, format: &str) -> Result<Vec<TeamMember>> {
        let reply = self.request(json!({ "op": "generate", "format": format }))?;
        reply
            .team
            .ok_or_else(|| anyhow!("Bridge reply for 'generate' carried no team payload"))
    }
}

impl Drop for ShowdownBridge {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
