// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANGUAGE: &str = "pt";
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["pt", "en"];

// Mensagens de erro por idioma, indexadas pelo código do AppError.
const MESSAGES: &[(&str, &str, &str)] = &[
    // (código, pt, en)
    ("VALIDATION_ERROR", "Um ou mais campos são inválidos.", "One or more fields are invalid."),
    ("INVALID_CREDENTIALS", "Usuário ou senha inválidos.", "Invalid username or password."),
    (
        "INVALID_TOKEN",
        "Token de autenticação inválido ou ausente.",
        "Invalid or missing authentication token.",
    ),
    ("USER_NOT_FOUND", "Usuário não encontrado.", "User not found."),
    (
        "COMPANY_INACTIVE",
        "A empresa deste usuário está inativa.",
        "This user's company is inactive.",
    ),
    (
        "AUTHORIZATION_DENIED",
        "Você não tem permissão para realizar esta ação.",
        "You are not allowed to perform this action.",
    ),
    ("RESOURCE_NOT_FOUND", "Recurso não encontrado.", "Resource not found."),
    ("UNIQUE_CONSTRAINT_VIOLATION", "Este registro já existe.", "This record already exists."),
    (
        "INVALID_STATE_TRANSITION",
        "A operação não é permitida no status atual.",
        "The operation is not allowed in the current status.",
    ),
    ("INTERNAL_SERVER_ERROR", "Ocorreu um erro inesperado.", "An unexpected error occurred."),
];

/// Catálogo de traduções carregado uma vez no AppState.
#[derive(Debug, Clone)]
pub struct I18nStore {
    // idioma -> (código -> mensagem)
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        let mut pt = HashMap::new();
        let mut en = HashMap::new();
        for (code, pt_msg, en_msg) in MESSAGES {
            pt.insert(*code, *pt_msg);
            en.insert(*code, *en_msg);
        }

        Self {
            messages: HashMap::from([("pt", pt), ("en", en)]),
        }
    }
}

impl I18nStore {
    /// Idioma desconhecido cai no padrão; código desconhecido volta como está.
    pub fn translate(&self, lang: &str, code: &str) -> String {
        self.messages
            .get(lang)
            .or_else(|| self.messages.get(DEFAULT_LANGUAGE))
            .and_then(|table| table.get(code))
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_codes() {
        let store = I18nStore::default();
        assert_eq!(store.translate("en", "USER_NOT_FOUND"), "User not found.");
        assert_eq!(store.translate("pt", "USER_NOT_FOUND"), "Usuário não encontrado.");
    }

    #[test]
    fn unknown_language_falls_back_to_default() {
        let store = I18nStore::default();
        assert_eq!(store.translate("de", "USER_NOT_FOUND"), "Usuário não encontrado.");
    }

    #[test]
    fn unknown_code_is_returned_verbatim() {
        assert_eq!(I18nStore::default().translate("en", "SOMETHING_NEW"), "SOMETHING_NEW");
    }

    #[test]
    fn every_code_has_both_languages() {
        let store = I18nStore::default();
        for (code, _, _) in MESSAGES {
            for lang in SUPPORTED_LANGUAGES {
                assert_ne!(store.translate(lang, code), *code);
            }
        }
    }
}
