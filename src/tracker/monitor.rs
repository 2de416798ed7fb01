use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use std::process::Command;

use crate::models::activity::Sample;
use crate::tracker::Sampler;

/// X11 foreground-window sampler built on `xdotool`, with an `xprop`
/// fallback. This is the reference platform hook; any other observer can
/// stand in by implementing [`Sampler`].
pub struct AppMonitor;

impl AppMonitor {
    pub fn new() -> Self {
        Self
    }

    fn active_window_pid(&self) -> Result<String> {
        let output = Command::new("xdotool")
            .args(["getactivewindow", "getwindowpid"])
            .output()?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }

        // Fallback: resolve the active window id via xprop, then its PID
        let window_id_output = Command::new("xprop").args(["-root", "_NET_ACTIVE_WINDOW"]).output()?;
        if !window_id_output.status.success() {
            return Ok(String::new());
        }
        let window_id_line = String::from_utf8_lossy(&window_id_output.stdout);
        let window_id = window_id_line.split_whitespace().last().unwrap_or("");
        if window_id.is_empty() || window_id == "0x0" {
            return Ok(String::new());
        }

        let pid_output = Command::new("xprop").args(["-id", window_id, "_NET_WM_PID"]).output()?;
        if pid_output.status.success() {
            let pid_line = String::from_utf8_lossy(&pid_output.stdout);
            let pid = pid_line.split('=').nth(1).unwrap_or("").trim();
            return Ok(pid.to_string());
        }
        Ok(String::new())
    }

    fn active_window_title(&self) -> Result<Option<String>> {
        let output = Command::new("xdotool")
            .args(["getactivewindow", "getwindowname"])
            .output()?;
        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
        } else {
            Ok(None)
        }
    }

    fn app_from_pid(&self, pid: &str) -> Result<String> {
        let output = Command::new("ps").args(["-p", pid, "-o", "comm="]).output()?;
        if output.status.success() {
            Ok(fix_app_name(String::from_utf8_lossy(&output.stdout).trim().to_string()))
        } else {
            Ok("Unknown".to_string())
        }
    }

    fn process_path_from_pid(&self, pid: &str) -> Option<String> {
        std::fs::read_link(format!("/proc/{pid}/exe"))
            .ok()
            .map(|p| p.to_string_lossy().into_owned())
    }
}

impl Default for AppMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize process names that report under a different binary name.
fn fix_app_name(app: String) -> String {
    if app.contains("gnome-terminal") {
        "gnome-terminal".to_string()
    } else if app == "soffice.bin" {
        "libreoffice".to_string()
    } else {
        app
    }
}

#[async_trait]
impl Sampler for AppMonitor {
    async fn sample(&mut self) -> Result<Option<Sample>> {
        let pid = self.active_window_pid()?;
        if pid.is_empty() {
            log::debug!("No active window detected");
            return Ok(None);
        }

        let app_name = self.app_from_pid(&pid)?;
        let window_title = self.active_window_title()?.unwrap_or_else(|| "Untitled".to_string());

        Ok(Some(Sample {
            app_name,
            window_title,
            url: None,
            process_path: self.process_path_from_pid(&pid),
            timestamp: Local::now(),
        }))
    }
}
