// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::directory::UserRole;

// Estrutura de dados ("claims") dentro do JWT emitido pelo serviço de
// contas. Aqui só validamos; login/registro ficam fora deste serviço.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // Subject (ID do usuário)
    pub role: UserRole,
    pub clinic_id: Option<Uuid>,
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}
