use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::ids::{BookingId, UserId};
use crate::models::booking::Booking;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Customer,
    Agent,
    Admin,
    VenueManager,
}

impl AccountType {
    /// Может ли аккаунт управлять шоу и акциями площадки.
    pub fn is_staff(self) -> bool {
        matches!(self, AccountType::VenueManager | AccountType::Admin)
    }
}

/// Журнал бронирований покупателя.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Customer {
    bookings: Vec<Booking>,
}

impl Customer {
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn add_booking(&mut self, booking: Booking) {
        self.bookings.push(booking);
    }

    /// Удаляет бронирование. Места при этом остаются проданными.
    pub fn cancel_booking(&mut self, id: BookingId) -> Result<Booking> {
        let pos = self
            .bookings
            .iter()
            .position(|b| b.id() == id)
            .ok_or_else(|| EngineError::not_found("booking", id))?;
        Ok(self.bookings.remove(pos))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Account {
    Customer(Customer),
    Agent,
    Admin,
    VenueManager,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    password: String,
    pub account: Account,
}

impl User {
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        account: Account,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            username: username.into(),
            email: email.into(),
            password: password.into(),
            account,
        }
    }

    pub fn account_type(&self) -> AccountType {
        match self.account {
            Account::Customer(_) => AccountType::Customer,
            Account::Agent => AccountType::Agent,
            Account::Admin => AccountType::Admin,
            Account::VenueManager => AccountType::VenueManager,
        }
    }

    // Пароли в открытом виде, как в демо-данных
    pub fn verify_password(&self, password: &str) -> bool {
        self.password == password
    }

    pub fn as_customer(&self) -> Result<&Customer> {
        match &self.account {
            Account::Customer(customer) => Ok(customer),
            _ => Err(not_a_customer(&self.username)),
        }
    }

    pub fn as_customer_mut(&mut self) -> Result<&mut Customer> {
        let username = &self.username;
        match &mut self.account {
            Account::Customer(customer) => Ok(customer),
            _ => Err(not_a_customer(username)),
        }
    }
}

fn not_a_customer(username: &str) -> EngineError {
    EngineError::permission(format!(
        "{} is not a customer account and cannot hold bookings",
        username
    ))
}

/// Зарегистрированные пользователи. Регистрация через API не поддерживается:
/// справочник заполняется при старте.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Vec<User>,
    next_id: u32,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет пользователя; имя пользователя и email должны быть уникальны.
    pub fn add(
        &mut self,
        name: &str,
        username: &str,
        email: &str,
        password: &str,
        account: Account,
    ) -> Result<UserId> {
        if self
            .users
            .iter()
            .any(|u| u.username == username || u.email == email)
        {
            return Err(EngineError::validation(format!(
                "username {} or email {} already registered",
                username, email
            )));
        }

        let id = UserId(self.next_id);
        self.next_id += 1;
        self.users
            .push(User::new(id, name, username, email, password, account));
        Ok(id)
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.username == username && u.verify_password(password))
    }

    pub fn get(&self, id: UserId) -> Result<&User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| EngineError::not_found("user", id))
    }

    pub fn get_mut(&mut self, id: UserId) -> Result<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| EngineError::not_found("user", id))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
