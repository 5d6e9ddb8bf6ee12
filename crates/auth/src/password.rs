/// Shared-password login check.
///
/// There are no user accounts; anyone holding the configured password gets a
/// session.
#[derive(Clone)]
pub struct PasswordGate {
    password: String,
}

impl PasswordGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    /// Compare a submitted password. Surrounding whitespace is ignored on
    /// both sides.
    pub fn check(&self, submitted: &str) -> bool {
        constant_time_eq(self.password.trim().as_bytes(), submitted.trim().as_bytes())
    }

    /// Passwords shorter than eight characters are flagged at startup.
    pub fn is_weak(&self) -> bool {
        self.password.trim().chars().count() < 8
    }
}

impl std::fmt::Debug for PasswordGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordGate").finish_non_exhaustive()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
