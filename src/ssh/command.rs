// ABOUTME: Builds the privileged reboot command run on each host
// ABOUTME: Substitutes the host's password into a configurable template

pub const PASSWORD_PLACEHOLDER: &str = "{password}";
pub const DEFAULT_REBOOT_COMMAND: &str = "echo {password} | sudo -S shutdown -r now";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebootCommand {
    template: String,
}

impl RebootCommand {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The command line sent to the host. The password is inserted verbatim,
    /// so it travels in clear text inside the remote command.
    pub fn render(&self, password: &str) -> String {
        self.template.replace(PASSWORD_PLACEHOLDER, password)
    }

    /// Loggable form of the command.
    pub fn redacted(&self) -> String {
        self.template.replace(PASSWORD_PLACEHOLDER, "****")
    }

    pub fn uses_password(&self) -> bool {
        self.template.contains(PASSWORD_PLACEHOLDER)
    }
}

impl Default for RebootCommand {
    fn default() -> Self {
        Self::new(DEFAULT_REBOOT_COMMAND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_matches_sudo_reboot() {
        let command = RebootCommand::default();
        assert_eq!(
            command.render("pass123"),
            "echo pass123 | sudo -S shutdown -r now"
        );
        assert!(command.uses_password());
    }

    #[test]
    fn test_redacted_hides_password() {
        let command = RebootCommand::default();
        let redacted = command.redacted();

        assert_eq!(redacted, "echo **** | sudo -S shutdown -r now");
        assert!(!redacted.contains(PASSWORD_PLACEHOLDER));
    }

    #[test]
    fn test_template_without_placeholder() {
        let command = RebootCommand::new("sudo -n shutdown -r now");

        assert!(!command.uses_password());
        assert_eq!(command.render("secret"), "sudo -n shutdown -r now");
    }

    #[test]
    fn test_every_placeholder_is_substituted() {
        let command = RebootCommand::new("echo {password} && echo {password}");
        assert_eq!(command.render("pw"), "echo pw && echo pw");
    }
}
