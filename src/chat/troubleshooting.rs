// src/chat/troubleshooting.rs — Canned troubleshooting steps per category

/// Checked in order against the lower-cased category name.
const STEPS: &[(&str, &str)] = &[
    (
        "network",
        "1. Restart your router and modem by unplugging them for 30 seconds, then plugging back in\n\
         2. Check if other devices can connect to the same network\n\
         3. Try connecting to both WiFi and wired connections if possible\n\
         4. Reset your network adapter by going to Settings > Network > Reset\n\
         5. Contact your internet service provider to check for outages",
    ),
    (
        "software",
        "1. Make sure your system meets the minimum requirements for the software\n\
         2. Run the installer as Administrator\n\
         3. Temporarily disable any antivirus or firewall that might be blocking installation\n\
         4. Clear temporary files and try reinstalling\n\
         5. Download a fresh copy of the installer from the official website",
    ),
    (
        "account",
        "1. Log out from all devices and log back in\n\
         2. Clear your browser cache and cookies\n\
         3. Reset your password using the 'Forgot Password' link\n\
         4. Check if your account has been locked for security reasons\n\
         5. Verify your email address is correct in your profile settings",
    ),
    (
        "payment",
        "1. Verify your payment information is entered correctly\n\
         2. Check if your credit card has sufficient funds and isn't expired\n\
         3. Try using a different payment method\n\
         4. Check if your bank is blocking the transaction\n\
         5. Clear your browser cache and try again in an incognito/private window",
    ),
    (
        "device",
        "1. Check if your device meets the minimum system requirements\n\
         2. Update to the latest drivers for your device\n\
         3. Update your operating system to the latest version\n\
         4. Try using the application in compatibility mode\n\
         5. Restart your device and try again",
    ),
];

const GENERIC_STEPS: &str = "1. Restart your device and try again\n\
     2. Clear temporary files and browser cache\n\
     3. Check for any error messages and note them down\n\
     4. Update any related software to the latest version\n\
     5. Check if others are experiencing similar issues";

pub const SYSTEM_PROMPT: &str = "You are an expert technical support agent. \
Provide 3-5 specific troubleshooting steps for the given issue category and description. \
Format as a numbered list. Keep steps clear and actionable.";

pub fn prompt(category: &str, description: &str) -> String {
    format!(
        "Issue Category: {category}\nIssue Description: {description}\n\nProvide troubleshooting steps:"
    )
}

pub fn fallback_steps(category: &str) -> &'static str {
    let lowered = category.to_lowercase();
    STEPS
        .iter()
        .find(|(key, _)| lowered.contains(key))
        .map_or(GENERIC_STEPS, |(_, steps)| *steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::category;

    #[test]
    fn test_each_canonical_category_has_steps() {
        assert!(fallback_steps(category::NETWORK).starts_with("1. Restart your router"));
        assert!(fallback_steps(category::SOFTWARE).starts_with("1. Make sure your system"));
        assert!(fallback_steps(category::ACCOUNT).starts_with("1. Log out"));
        assert!(fallback_steps(category::PAYMENT).starts_with("1. Verify your payment"));
        assert!(fallback_steps(category::DEVICE).starts_with("1. Check if your device"));
    }

    #[test]
    fn test_generic_steps() {
        let steps = fallback_steps(category::GENERAL_SUPPORT);
        assert!(steps.starts_with("1. Restart your device"));
        assert_eq!(steps.lines().count(), 5);
        assert!(steps.lines().nth(1).unwrap().starts_with("2. Clear"));
    }
}
