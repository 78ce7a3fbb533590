use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub address: String,
}
