//! The conversational intake pipeline.
//!
//! One inbound update runs through a short gate sequence (registration,
//! password setup) before reaching classification and dispatch. Outbound
//! send failures are logged and swallowed so the webhook can always ack;
//! storage failures surface as Portuguese error replies, never as raw
//! errors to the chat.

use std::sync::{Arc, OnceLock};

use anyhow::Result;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::aggregation::{LabeledTransaction, QuerySummary};
use crate::clock::{Clock, SystemClock};
use crate::format;
use crate::models::{
    ClassificationResult, CodeGenerator, ParsedQuery, ParsedTransaction, RandomCodeGenerator,
    Transaction, User, UserProfile, DEFAULT_CATEGORY,
};
use crate::oracle::{prompt, ContentPart, OracleChain};
use crate::storage::LedgerStore;
use crate::telegram::{ChatApi, Contact, Message, TelegramUser, Update};

const GREETING_KNOWN: &str = "Sou a Grana, sua assistente financeira. Como posso ajudar?";
const CONTACT_REQUEST: &str = "Olá! Sou a Grana, sua assistente financeira pessoal. 🤖💰\n\nCompartilhe seu contato para começarmos!";
const REGISTERED: &str =
    "✅ Conta criada com sucesso!\n\nAgora defina uma senha de 6 números para acessar o painel web.";
const REGISTER_FAILED: &str = "❌ Erro ao registrar. Tente novamente.";
const NOT_REGISTERED: &str = "👋 Olá! Digite /start para se cadastrar na Grana.";
const PASSWORD_SAVED: &str = "🔐 Senha salva!\n\nAgora você pode me enviar suas transações. Exemplo:\n• \"Gastei 50 no mercado\"\n• \"Recebi 1500 de salário\"";
const PASSWORD_INVALID: &str = "⚠️ A senha deve ter exatamente 6 números.";
const DEFAULT_CHAT_REPLY: &str = "Olá! Como posso ajudar com suas finanças? 💰";
const SAVE_FAILED: &str = "❌ Erro ao salvar transação.";
const QUERY_PROGRESS: &str = "🔍 Consultando seus dados...";
const QUERY_EMPTY: &str = "📭 Nenhuma transação encontrada no período solicitado.";

fn password_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{6}$").expect("valid password pattern"))
}

/// Everything one update needs, wired once at startup.
pub struct IntakePipeline {
    store: Arc<dyn LedgerStore>,
    oracle: OracleChain,
    chat: Arc<dyn ChatApi>,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeGenerator>,
}

impl IntakePipeline {
    pub fn new(store: Arc<dyn LedgerStore>, oracle: OracleChain, chat: Arc<dyn ChatApi>) -> Self {
        Self {
            store,
            oracle,
            chat,
            clock: Arc::new(SystemClock),
            codes: Arc::new(RandomCodeGenerator),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_codes(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    /// Process one webhook update end to end.
    ///
    /// Returns `Err` only for failures the caller cannot act on anyway;
    /// user-visible errors have already been sent as chat replies by then.
    pub async fn handle_update(&self, update: &Update) -> Result<()> {
        let Some(message) = update.message() else {
            debug!("update carries no message, ignoring");
            return Ok(());
        };
        let Some(from) = message.from.as_ref() else {
            debug!("message carries no sender, ignoring");
            return Ok(());
        };
        let chat_id = message.chat.id;
        let text = message.text_content().trim().to_string();

        let user = self.store.find_user_by_telegram_id(from.id).await?;

        if text == "/start" {
            return self.handle_start(chat_id, user.as_ref()).await;
        }
        if let Some(contact) = message.contact.as_ref() {
            return self.handle_contact(chat_id, from, contact).await;
        }

        let Some(user) = user else {
            self.send(chat_id, NOT_REGISTERED).await;
            return Ok(());
        };

        if !user.has_password() {
            return self.handle_password_setup(chat_id, &user, &text).await;
        }

        let Some(parts) = self.collect_parts(message, &text).await else {
            debug!(chat_id, "message has no usable content, ignoring");
            return Ok(());
        };

        let system_prompt = prompt::classifier_prompt(self.clock.today());
        match self.oracle.classify(&system_prompt, parts).await {
            ClassificationResult::Chat { message } => {
                let reply = message.unwrap_or_else(|| DEFAULT_CHAT_REPLY.to_string());
                self.send(chat_id, &reply).await;
            }
            ClassificationResult::Delete { tx_code } => {
                self.handle_delete(chat_id, &user, &tx_code).await?;
            }
            ClassificationResult::Transaction(parsed) => {
                self.handle_transaction(chat_id, &user, parsed).await?;
            }
            ClassificationResult::Query(parsed) => {
                self.handle_query(chat_id, &user, &text, parsed).await?;
            }
        }
        Ok(())
    }

    async fn handle_start(&self, chat_id: i64, user: Option<&User>) -> Result<()> {
        match user {
            Some(user) => {
                let name = user.first_name().unwrap_or("tudo bem");
                let greeting = format!("Olá de novo, {name}! 👋\n\n{GREETING_KNOWN}");
                self.send(chat_id, &greeting).await;
            }
            None => {
                if let Err(err) = self.chat.send_contact_request(chat_id, CONTACT_REQUEST).await {
                    warn!(chat_id, error = %err, "failed to send contact request");
                }
            }
        }
        Ok(())
    }

    async fn handle_contact(
        &self,
        chat_id: i64,
        from: &TelegramUser,
        contact: &Contact,
    ) -> Result<()> {
        // Only the sender's own contact registers an account; forwarded
        // address-book contacts are dropped without a reply.
        if contact.user_id != Some(from.id) {
            debug!(chat_id, "contact does not belong to the sender, ignoring");
            return Ok(());
        }

        let profile = UserProfile {
            telegram_id: from.id,
            phone_number: contact.phone_number.clone(),
            full_name: from.full_name(),
        };
        match self.store.upsert_user(&profile).await {
            Ok(()) => {
                info!(telegram_id = from.id, "user registered");
                self.send(chat_id, REGISTERED).await;
            }
            Err(err) => {
                warn!(telegram_id = from.id, error = %err, "user upsert failed");
                self.send(chat_id, REGISTER_FAILED).await;
            }
        }
        Ok(())
    }

    async fn handle_password_setup(&self, chat_id: i64, user: &User, text: &str) -> Result<()> {
        if password_pattern().is_match(text) {
            self.store.set_password(&user.id, text).await?;
            info!(telegram_id = user.telegram_id, "password set");
            self.send(chat_id, PASSWORD_SAVED).await;
        } else {
            self.send(chat_id, PASSWORD_INVALID).await;
        }
        Ok(())
    }

    /// Build the oracle content parts: the message text plus the largest
    /// photo's URL. A photo whose URL cannot be resolved is skipped rather
    /// than blocking the text.
    async fn collect_parts(&self, message: &Message, text: &str) -> Option<Vec<ContentPart>> {
        let mut parts = Vec::new();
        if !text.is_empty() {
            parts.push(ContentPart::Text(text.to_string()));
        }
        if let Some(photo) = message.largest_photo() {
            match self.chat.file_url(&photo.file_id).await {
                Ok(url) => parts.push(ContentPart::ImageUrl(url)),
                Err(err) => {
                    warn!(file_id = %photo.file_id, error = %err, "failed to resolve photo url");
                }
            }
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts)
        }
    }

    async fn handle_delete(&self, chat_id: i64, user: &User, tx_code: &str) -> Result<()> {
        let code = tx_code.trim().to_uppercase();
        match self.store.find_transaction_by_code(&user.id, &code).await? {
            None => {
                self.send(chat_id, &format!("❌ Transação {code} não encontrada."))
                    .await;
            }
            Some(tx) => {
                self.store.delete_transaction(&tx.id).await?;
                info!(tx_code = %code, "transaction deleted");
                let reply = format!(
                    "🗑️ Transação {code} excluída com sucesso!\n\n*{}* - {}",
                    tx.description,
                    format::format_currency(tx.amount)
                );
                self.send(chat_id, &reply).await;
            }
        }
        Ok(())
    }

    async fn handle_transaction(
        &self,
        chat_id: i64,
        user: &User,
        parsed: ParsedTransaction,
    ) -> Result<()> {
        let date = parsed.date.unwrap_or_else(|| self.clock.today());
        let mut tx = Transaction::new(
            user.id.clone(),
            self.codes.generate(),
            parsed.amount,
            parsed.description,
            date,
        )
        .with_category(parsed.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()));
        if let Some(subcategory) = parsed.subcategory {
            tx = tx.with_subcategory(subcategory);
        }
        if let Some(tx_type) = parsed.tx_type {
            tx = tx.with_type(tx_type);
        }
        if let Some(status) = parsed.status {
            tx = tx.with_status(status);
        }
        if let Some(recurrence) = parsed.recurrence {
            tx = tx.with_recurrence(recurrence);
        }
        if let Some(is_fixed) = parsed.is_fixed {
            tx = tx.with_is_fixed(is_fixed);
        }

        match self.store.insert_transaction(&tx).await {
            Ok(()) => {
                info!(tx_code = %tx.tx_code, amount = %tx.amount, "transaction recorded");
                self.send(chat_id, &format::receipt(&tx)).await;
            }
            Err(err) => {
                warn!(error = %err, "transaction insert failed");
                self.send(chat_id, SAVE_FAILED).await;
            }
        }
        Ok(())
    }

    async fn handle_query(
        &self,
        chat_id: i64,
        user: &User,
        question: &str,
        parsed: ParsedQuery,
    ) -> Result<()> {
        self.send(chat_id, QUERY_PROGRESS).await;

        let mut rows: Vec<LabeledTransaction> = Vec::new();
        for period in &parsed.periods {
            let fetched = match self
                .store
                .transactions_in_period(
                    &user.id,
                    parsed.filter_type,
                    period.start_date,
                    period.end_date,
                )
                .await
            {
                Ok(fetched) => fetched,
                Err(err) => {
                    warn!(label = %period.label, error = %err, "period query failed");
                    continue;
                }
            };
            rows.extend(fetched.into_iter().map(|transaction| LabeledTransaction {
                period_label: period.label.clone(),
                transaction,
            }));
        }

        if rows.is_empty() {
            self.send(chat_id, QUERY_EMPTY).await;
            return Ok(());
        }

        let summary = QuerySummary::build(parsed.query_type, parsed.filter_type, &parsed.periods, rows);
        let summary_json = serde_json::to_string(&summary)?;
        let answer = self
            .oracle
            .answer(&prompt::analyst_prompt(question, &summary_json))
            .await;
        self.send(chat_id, &answer).await;
        Ok(())
    }

    /// Outbound failures never abort the pipeline.
    async fn send(&self, chat_id: i64, text: &str) {
        if let Err(err) = self.chat.send_message(chat_id, text).await {
            warn!(chat_id, error = %err, "failed to send message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_pattern_accepts_exactly_six_digits() {
        assert!(password_pattern().is_match("123456"));
        assert!(!password_pattern().is_match("12345"));
        assert!(!password_pattern().is_match("1234567"));
        assert!(!password_pattern().is_match("12345a"));
        assert!(!password_pattern().is_match(""));
    }
}
