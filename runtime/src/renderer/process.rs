//! Subprocess-backed renderer.
//!
//! Each render spawns `program [args...] <url>`, reads the page text from the
//! child's stdout and diagnostics from its stderr. The child runs in its own
//! process group so that a timeout or a dropped request takes down any
//! browser processes it started, not just the direct child.

use super::DynamicRenderer;
use crate::config::RendererCommand;
use crate::error::{ExtractionError, ExtractionResult};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

pub struct ProcessRenderer {
    command: RendererCommand,
}

impl ProcessRenderer {
    pub fn new(command: RendererCommand) -> Self {
        Self { command }
    }

    fn build(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }
}

#[async_trait]
impl DynamicRenderer for ProcessRenderer {
    async fn render(&self, url: &str, timeout: Duration) -> ExtractionResult<String> {
        let mut child = self.build(url).spawn().map_err(|e| {
            ExtractionError::render_failure(format!(
                "failed to start renderer {}: {e}",
                self.command.program.display()
            ))
        })?;
        let mut group = ProcessGroup::new(child.id());
        debug!(url, pid = ?child.id(), "renderer spawned");

        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();

        let finished = tokio::time::timeout(timeout, async {
            tokio::join!(
                child.wait(),
                read_to_end(stdout.as_mut()),
                read_to_end(stderr.as_mut()),
            )
        })
        .await;

        match finished {
            Ok((Ok(status), out, err)) => {
                // The leader is reaped; its pgid may be reused from here on.
                group.disarm();
                if status.success() {
                    Ok(String::from_utf8_lossy(&out).into_owned())
                } else {
                    let diagnostics = String::from_utf8_lossy(&err).trim().to_string();
                    warn!(url, %status, "renderer failed");
                    let detail = if diagnostics.is_empty() {
                        format!("renderer exited with {status}")
                    } else {
                        diagnostics
                    };
                    Err(ExtractionError::render_failure(detail))
                }
            }
            Ok((Err(e), _, _)) => {
                group.kill();
                Err(ExtractionError::render_failure(format!(
                    "failed waiting on renderer: {e}"
                )))
            }
            Err(_) => {
                warn!(url, timeout_ms = timeout.as_millis() as u64, "renderer timed out, killing");
                group.kill();
                // Sends SIGKILL and reaps.
                let _ = child.kill().await;
                Err(ExtractionError::render_timeout(format!(
                    "renderer did not finish within {}ms",
                    timeout.as_millis()
                )))
            }
        }
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

async fn read_to_end<R: AsyncRead + Unpin>(stream: Option<&mut R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(s) = stream {
        if let Err(e) = s.read_to_end(&mut buf).await {
            debug!("renderer pipe read error: {e}");
        }
    }
    buf
}

/// Kills the child's process group when told to, or when dropped while armed.
struct ProcessGroup {
    pgid: Option<u32>,
}

impl ProcessGroup {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    fn kill(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_process_group(pgid);
        }
    }

    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pgid) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        // ESRCH once every member has exited.
        debug!(pgid, "killpg failed: {e}");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::ExtractionErrorKind;
    use std::os::unix::process::CommandExt;
    use std::path::{Path, PathBuf};
    use std::time::Instant;

    fn sh(script: &str) -> ProcessRenderer {
        ProcessRenderer::new(RendererCommand {
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
        })
    }

    /// Alive means present and not a zombie.
    fn process_alive(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit(')')
                .next()
                .and_then(|rest| rest.split_whitespace().next())
                .map(|state| state != "Z")
                .unwrap_or(false),
            Err(_) => {
                if Path::new("/proc/self").exists() {
                    false
                } else {
                    std::process::Command::new("kill")
                        .args(["-0", &pid.to_string()])
                        .status()
                        .map(|s| s.success())
                        .unwrap_or(false)
                }
            }
        }
    }

    async fn wait_until_gone(pid: u32) -> bool {
        let deadline = Instant::now() + Duration::from_secs(3);
        while Instant::now() < deadline {
            if !process_alive(pid) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        false
    }

    async fn read_pid(path: &Path) -> u32 {
        let deadline = Instant::now() + Duration::from_secs(3);
        loop {
            if let Ok(s) = std::fs::read_to_string(path) {
                if let Ok(pid) = s.trim().parse() {
                    return pid;
                }
            }
            assert!(Instant::now() < deadline, "pid file never written");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_stdout_is_returned_on_success() {
        let r = sh("printf 'rendered text\\n'; echo progress >&2");
        let text = r.render("https://example.com", Duration::from_secs(5)).await.unwrap();
        assert_eq!(text, "rendered text\n");
    }

    #[tokio::test]
    async fn test_url_is_the_sole_extra_argument() {
        let r = sh("printf '%s|%s' \"$#\" \"$1\"");
        let text = r
            .render("https://example.com/a?b=c d", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(text, "1|https://example.com/a?b=c d");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_render_failure_with_stderr() {
        let r = sh("echo partial; echo 'Puppeteer error: boom' >&2; exit 3");
        let err = r.render("https://example.com", Duration::from_secs(5)).await.unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::RenderFailure);
        assert_eq!(err.detail, "Puppeteer error: boom");
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_stderr_reports_status() {
        let r = sh("exit 2");
        let err = r.render("https://example.com", Duration::from_secs(5)).await.unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::RenderFailure);
        assert!(err.detail.contains('2'), "{}", err.detail);
    }

    #[tokio::test]
    async fn test_missing_program_is_render_failure() {
        let r = ProcessRenderer::new(RendererCommand {
            program: PathBuf::from("/nonexistent/renderer-binary"),
            args: vec![],
        });
        let err = r.render("https://example.com", Duration::from_secs(5)).await.unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::RenderFailure);
        assert!(err.detail.contains("failed to start renderer"));
    }

    #[tokio::test]
    async fn test_timeout_kills_child_and_its_children() {
        let dir = tempfile::tempdir().unwrap();
        let child_pid = dir.path().join("child.pid");
        let grandchild_pid = dir.path().join("grandchild.pid");
        let script = format!(
            "sleep 30 & echo $! > '{}'; echo $$ > '{}'; wait",
            grandchild_pid.display(),
            child_pid.display()
        );

        let started = Instant::now();
        let err = sh(&script)
            .render("https://example.com", Duration::from_millis(500))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::RenderTimeout);
        assert!(started.elapsed() < Duration::from_secs(5));

        let pid = read_pid(&child_pid).await;
        let gpid = read_pid(&grandchild_pid).await;
        assert!(wait_until_gone(pid).await, "renderer {pid} still running");
        assert!(wait_until_gone(gpid).await, "renderer child {gpid} still running");
    }

    #[tokio::test]
    async fn test_kill_process_group_reaches_every_member() {
        let dir = tempfile::tempdir().unwrap();
        let grandchild_pid = dir.path().join("grandchild.pid");
        let mut child = std::process::Command::new("sh")
            .args([
                "-c",
                &format!("sleep 30 & echo $! > '{}'; wait", grandchild_pid.display()),
            ])
            .process_group(0)
            .spawn()
            .unwrap();
        let gpid = read_pid(&grandchild_pid).await;

        kill_process_group(child.id());
        child.wait().unwrap();
        assert!(wait_until_gone(gpid).await, "group member {gpid} survived");

        // Signalling an empty group is harmless.
        kill_process_group(child.id());
    }

    #[tokio::test]
    async fn test_successful_render_does_not_signal_the_group() {
        let dir = tempfile::tempdir().unwrap();
        let detached_pid = dir.path().join("detached.pid");
        let script = format!(
            "sleep 30 >/dev/null 2>&1 & echo $! > '{}'; echo done",
            detached_pid.display()
        );

        let text = sh(&script)
            .render("https://example.com", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(text, "done\n");

        let pid = read_pid(&detached_pid).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        let survived = process_alive(pid);
        let _ = nix::sys::signal::kill(
            nix::unistd::Pid::from_raw(pid as i32),
            nix::sys::signal::Signal::SIGKILL,
        );
        assert!(survived, "group was signalled after a clean exit");
    }

    #[tokio::test]
    async fn test_dropped_render_kills_child() {
        let dir = tempfile::tempdir().unwrap();
        let child_pid = dir.path().join("child.pid");
        let script = format!("echo $$ > '{}'; exec sleep 30", child_pid.display());

        let renderer = sh(&script);
        let handle = tokio::spawn(async move {
            renderer.render("https://example.com", Duration::from_secs(60)).await
        });

        let pid = read_pid(&child_pid).await;
        assert!(process_alive(pid));
        handle.abort();
        let _ = handle.await;

        assert!(wait_until_gone(pid).await, "renderer {pid} survived cancellation");
    }
}
