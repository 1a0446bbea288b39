// Shell command that performs a switch when executed later (launcher actions)
use micswitch_utils::StringUtils;
use std::time::Duration;

/// Longest device label shown in the notification.
pub const MAX_DISPLAY_CHARS: usize = 50;

/// Builds a single-line `sh` command equivalent to a switch with `pactl`.
///
/// Active streams are enumerated when the command runs, not when it is
/// built. Setting the default must succeed for the rest to run; each stream
/// move and the notification may fail on their own.
#[derive(Debug, Clone)]
pub struct SwitchCommandBuilder {
    pactl: String,
    notification_expire: Option<Duration>,
}

impl SwitchCommandBuilder {
    pub fn new(pactl: impl Into<String>) -> Self {
        Self {
            pactl: pactl.into(),
            notification_expire: None,
        }
    }

    /// Append a `notify-send` call announcing the new default.
    pub fn with_notification(mut self, expire: Duration) -> Self {
        self.notification_expire = Some(expire);
        self
    }

    pub fn build(&self, source_name: &str, display_name: &str) -> String {
        let pactl = StringUtils::shell_quote(&self.pactl);
        let source = StringUtils::shell_quote(source_name);

        let mut command = format!(
            "{pactl} set-default-source {source} 2>&1 && \
             for stream_id in $({pactl} list short source-outputs 2>/dev/null | cut -f1); do \
             if [ -n \"$stream_id\" ]; then \
             {pactl} move-source-output \"$stream_id\" {source} 2>&1 || true; \
             fi; \
             done"
        );

        if let Some(expire) = self.notification_expire {
            let message = format!(
                "Switched to: {}",
                StringUtils::truncate_chars(display_name, MAX_DISPLAY_CHARS)
            );
            command.push_str(&format!(
                " && (notify-send {} {} --expire-time={} 2>/dev/null || true)",
                StringUtils::shell_quote("Microphone Changed"),
                StringUtils::shell_quote(&message),
                expire.as_millis()
            ));
        }
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_without_notification() {
        let command = SwitchCommandBuilder::new("pactl").build("alsa_input.usb", "USB");
        assert_eq!(
            command,
            "'pactl' set-default-source 'alsa_input.usb' 2>&1 && \
             for stream_id in $('pactl' list short source-outputs 2>/dev/null | cut -f1); do \
             if [ -n \"$stream_id\" ]; then \
             'pactl' move-source-output \"$stream_id\" 'alsa_input.usb' 2>&1 || true; \
             fi; done"
        );
    }

    #[test]
    fn test_build_with_notification() {
        let command = SwitchCommandBuilder::new("pactl")
            .with_notification(Duration::from_millis(1500))
            .build("mic", "Desk Mic");
        assert!(command.ends_with(
            " && (notify-send 'Microphone Changed' 'Switched to: Desk Mic' --expire-time=1500 2>/dev/null || true)"
        ));
    }

    #[test]
    fn test_display_name_truncated() {
        let long = "x".repeat(80);
        let command = SwitchCommandBuilder::new("pactl")
            .with_notification(Duration::from_millis(800))
            .build("mic", &long);
        assert!(command.contains(&format!("'Switched to: {}'", "x".repeat(MAX_DISPLAY_CHARS))));
        assert!(!command.contains(&"x".repeat(MAX_DISPLAY_CHARS + 1)));
    }

    #[test]
    fn test_hostile_names_are_quoted() {
        let name = "bluez_input.00:1B:66:'; rm -rf ~; echo '";
        let command = SwitchCommandBuilder::new("pactl").build(name, name);
        let quoted = StringUtils::shell_quote(name);

        assert_eq!(command.matches(&quoted).count(), 2);
        assert!(!command.contains(&format!(" {} ", name)));
    }

    #[cfg(unix)]
    #[test]
    fn test_output_is_valid_sh() {
        let names = ["plain", "with space", "a:b", "it's", "$(touch /tmp/pwned)", "`id`;|&<>"];
        for name in names {
            let command = SwitchCommandBuilder::new("pactl")
                .with_notification(Duration::from_millis(800))
                .build(name, name);
            let status = std::process::Command::new("sh")
                .args(["-n", "-c", command.as_str()])
                .status()
                .unwrap();
            assert!(status.success(), "sh rejected: {}", command);
        }
    }

    /// Installs an executable `pactl` stand-in in `dir` that appends its
    /// arguments to `calls.log`, fails `set-default-source` while a `fail`
    /// file exists and prints `streams` for `list`.
    #[cfg(unix)]
    fn install_fake_pactl(dir: &std::path::Path) -> String {
        let quoted_dir = StringUtils::shell_quote(&dir.to_string_lossy());
        let script = format!(
            "#!/bin/sh\n\
             dir={quoted_dir}\n\
             echo \"$*\" >> \"$dir/calls.log\"\n\
             case \"$1\" in\n\
             set-default-source) [ -f \"$dir/fail\" ] && exit 1; exit 0 ;;\n\
             list) cat \"$dir/streams\" 2>/dev/null; exit 0 ;;\n\
             esac\n\
             exit 0\n"
        );
        let path = dir.join("pactl").to_string_lossy().to_string();
        // Written by a child shell so no writable descriptor of ours is open
        // when the stub is executed.
        let mut child = std::process::Command::new("sh")
            .args(["-c", "cat > \"$1\" && chmod 755 \"$1\"", "sh", path.as_str()])
            .stdin(std::process::Stdio::piped())
            .spawn()
            .unwrap();
        {
            use std::io::Write;
            child.stdin.take().unwrap().write_all(script.as_bytes()).unwrap();
        }
        assert!(child.wait().unwrap().success());
        path
    }

    #[cfg(unix)]
    fn run_sh(command: &str) -> std::process::ExitStatus {
        std::process::Command::new("sh")
            .args(["-c", command])
            .stdout(std::process::Stdio::null())
            .status()
            .unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_streams_are_listed_when_command_runs() {
        let dir = tempfile::tempdir().unwrap();
        let pactl = install_fake_pactl(dir.path());

        let command = SwitchCommandBuilder::new(pactl).build("usb mic", "USB");
        std::fs::write(dir.path().join("streams"), "12\t53\tprotocol-native.c\n40\t60\tx\n").unwrap();

        assert!(run_sh(&command).success());
        let calls = std::fs::read_to_string(dir.path().join("calls.log")).unwrap();
        assert_eq!(
            calls.lines().collect::<Vec<_>>(),
            vec![
                "set-default-source usb mic",
                "list short source-outputs",
                "move-source-output 12 usb mic",
                "move-source-output 40 usb mic",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_set_default_skips_stream_moves() {
        let dir = tempfile::tempdir().unwrap();
        let pactl = install_fake_pactl(dir.path());
        std::fs::write(dir.path().join("streams"), "12\t53\tx\n").unwrap();
        std::fs::write(dir.path().join("fail"), "").unwrap();

        let command = SwitchCommandBuilder::new(pactl).build("mic", "Mic");
        assert!(!run_sh(&command).success());

        let calls = std::fs::read_to_string(dir.path().join("calls.log")).unwrap();
        assert_eq!(calls.lines().collect::<Vec<_>>(), vec!["set-default-source mic"]);
    }
}
