/// Data required to persist a freshly registered user.
///
/// The password is already hashed; stores never see plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub lockout_enabled: bool,
}
