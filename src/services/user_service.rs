use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dto::admin_dto::{CreateUserPayload, UpdateUserPayload, UserListQuery};
use crate::dto::auth_dto::{SignupPayload, UpdateProfilePayload};
use crate::error::{is_unique_violation, Error, Result};
use crate::models::user::{User, ROLE_ADMIN, ROLE_STUDENT};
use crate::utils::password::{hash_password, verify_password};

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

pub struct UserList {
    pub items: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

const USER_COLUMNS: &str =
    "id, name, username, email, password_hash, role, created_at, updated_at";

fn validate_username(username: &str) -> Result<()> {
    let valid = username.len() >= 3
        && username.len() <= 20
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::BadRequest(
            "Username must be 3-20 characters of letters, digits, or underscore".to_string(),
        ))
    }
}

fn validate_role(role: &str) -> Result<()> {
    if role == ROLE_STUDENT || role == ROLE_ADMIN {
        Ok(())
    } else {
        Err(Error::BadRequest(format!("Invalid role: {}", role)))
    }
}

fn map_user_unique(e: sqlx::Error) -> Error {
    if is_unique_violation(&e, "users_username_key") {
        Error::BadRequest("Username already taken".to_string())
    } else if is_unique_violation(&e, "users_email_key") {
        Error::BadRequest("Email already registered".to_string())
    } else {
        e.into()
    }
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn signup(&self, payload: SignupPayload) -> Result<User> {
        validate_username(&payload.username)?;
        let password_hash = hash_password(&payload.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, username, email, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&payload.name)
        .bind(&payload.username)
        .bind(&payload.email)
        .bind(&password_hash)
        .bind(ROLE_STUDENT)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_unique)?;

        info!(user_id = %user.id, username = %user.username, "account created");
        Ok(user)
    }

    /// A missing user and a wrong password produce the same error, so the
    /// response does not reveal which usernames exist.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(user) = user else {
            return Err(Error::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        };

        if !verify_password(password, &user.password_hash)? {
            return Err(Error::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }

        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(user)
    }

    pub async fn username_available(&self, username: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(!exists)
    }

    pub async fn update_profile(&self, id: Uuid, payload: UpdateProfilePayload) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_unique)?;

        Ok(user)
    }

    pub async fn change_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self.get_by_id(id).await?;
        if !verify_password(current_password, &user.password_hash)? {
            return Err(Error::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        let password_hash = hash_password(new_password)?;
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(&password_hash)
            .execute(&self.pool)
            .await?;

        info!(user_id = %id, "password changed");
        Ok(())
    }

    pub async fn list(&self, query: UserListQuery) -> Result<UserList> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(role) = query.role {
            filters.push(format!("role = ${}", args.len() + 1));
            args.push(role);
        }
        if let Some(search) = query.search {
            let first = args.len() + 1;
            let second = first + 1;
            let third = second + 1;
            filters.push(format!(
                "(name ILIKE ${} OR username ILIKE ${} OR email ILIKE ${})",
                first, second, third
            ));
            args.push(format!("%{}%", search.clone()));
            args.push(format!("%{}%", search.clone()));
            args.push(format!("%{}%", search));
        }

        let where_clause = if filters.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let items_query = format!(
            "SELECT {USER_COLUMNS}
             FROM users
             {}
             ORDER BY created_at DESC
             LIMIT ${} OFFSET ${}",
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM users {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, User>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        items_statement = items_statement.bind(per_page).bind(offset);
        let items = items_statement.fetch_all(&self.pool).await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        let total_pages = ((total as f64) / (per_page as f64)).ceil() as i64;

        Ok(UserList {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<User> {
        validate_username(&payload.username)?;
        let role = payload.role.unwrap_or_else(|| ROLE_STUDENT.to_string());
        validate_role(&role)?;
        let password_hash = hash_password(&payload.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, username, email, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&payload.name)
        .bind(&payload.username)
        .bind(&payload.email)
        .bind(&password_hash)
        .bind(&role)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_unique)?;

        info!(user_id = %user.id, role = %user.role, "user created by administrator");
        Ok(user)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateUserPayload) -> Result<User> {
        if let Some(role) = &payload.role {
            validate_role(role)?;
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 role = COALESCE($4, role),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.role)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_unique)?;

        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("User not found".to_string()));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_charset_and_length() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("a".repeat(21).as_str()).is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("dash-ed").is_err());
    }

    #[test]
    fn only_known_roles_accepted() {
        assert!(validate_role("STUDENT").is_ok());
        assert!(validate_role("ADMIN").is_ok());
        assert!(validate_role("admin").is_err());
        assert!(validate_role("TEACHER").is_err());
    }
}
