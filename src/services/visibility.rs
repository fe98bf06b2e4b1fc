// src/services/visibility.rs

//! Ponto único de decisão de visibilidade.
//!
//! Todo acesso ao banco recebe um [`Scope`] produzido por [`scope`]. O escopo
//! sempre abre a cláusula `WHERE` com `company_id = <empresa do principal>`;
//! para `USER` soma a cláusula de dono nos recursos que têm dono. Filtros de
//! busca entram depois, com `AND`, e nunca substituem essas cláusulas.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Principal, Role},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Lead,
    Reminder,
    EmailLog,
    Tag,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// Cláusula de dono: `<coluna> = <id do perfil>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub column: &'static str,
    pub principal_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    company_id: Uuid,
    ownership: Option<Ownership>,
}

/// Coluna que identifica o dono de cada recurso. Tags e arquivos são
/// compartilhados pela empresa inteira.
fn owner_column(resource: Resource) -> Option<&'static str> {
    match resource {
        Resource::Lead => Some("assigned_to_id"),
        Resource::Reminder => Some("user_id"),
        Resource::EmailLog => Some("sent_by_id"),
        Resource::Tag | Resource::File => None,
    }
}

pub fn scope(principal: &Principal, resource: Resource, operation: Operation) -> Result<Scope, AppError> {
    // Principal inativo não existe para a política.
    if !principal.active {
        tracing::warn!(profile_id = %principal.id, "Principal inativo barrado pela política");
        return Err(AppError::ProfileMissing);
    }

    let ownership = match principal.role {
        Role::Admin => None,
        Role::User => owner_column(resource).map(|column| Ownership {
            column,
            principal_id: principal.id,
        }),
    };

    tracing::trace!(
        company_id = %principal.company_id,
        ?resource,
        ?operation,
        owned = ownership.is_some(),
        "Escopo resolvido"
    );

    Ok(Scope {
        company_id: principal.company_id,
        ownership,
    })
}

impl Scope {
    pub fn company_id(&self) -> Uuid {
        self.company_id
    }

    pub fn ownership(&self) -> Option<Ownership> {
        self.ownership
    }

    /// Abre o `WHERE` com as cláusulas de escopo. Deve ser a primeira coisa
    /// empurrada depois do `FROM`; filtros adicionais vêm com `AND`.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>, alias: &str) {
        qb.push(" WHERE ")
            .push(alias)
            .push(".company_id = ")
            .push_bind(self.company_id);

        if let Some(owner) = self.ownership {
            qb.push(" AND ")
                .push(alias)
                .push(".")
                .push(owner.column)
                .push(" = ")
                .push_bind(owner.principal_id);
        }
    }

    /// Avaliação em memória do mesmo predicado (usada pelos stores de teste).
    #[cfg(test)]
    pub fn admits(&self, company_id: Uuid, owner_id: Option<Uuid>) -> bool {
        if company_id != self.company_id {
            return false;
        }
        match self.ownership {
            None => true,
            Some(owner) => owner_id == Some(owner.principal_id),
        }
    }
}
