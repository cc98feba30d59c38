//! 提示詞模板與送出的聊天文字（俄文）

use crate::domain::model::{BirthdayEntry, Gender};

/// 性別判斷回覆中的標記字母（西里爾字母）
pub const MALE_MARKER: char = 'М';
pub const FEMALE_MARKER: char = 'Ж';

const MONTHS_NOMINATIVE: [&str; 12] = [
    "Январь", "Февраль", "Март", "Апрель", "Май", "Июнь", "Июль", "Август", "Сентябрь",
    "Октябрь", "Ноябрь", "Декабрь",
];

const MONTHS_PREPOSITIONAL: [&str; 12] = [
    "январе", "феврале", "марте", "апреле", "мае", "июне", "июле", "августе", "сентябре",
    "октябре", "ноябре", "декабре",
];

pub fn gender_prompt(name: &str) -> String {
    format!(
        "Определи пол человека по имени: \"{name}\"\n\
         Ответь только одной буквой: {MALE_MARKER} или {FEMALE_MARKER}"
    )
}

pub fn greeting_prompt(name: &str) -> String {
    format!(
        "Напиши поздравление с днём рождения для {name}.\n\n\
         Требования:\n\
         1. Сначала короткий стих (4-6 строк) с хорошей рифмой\n\
         2. Затем 2-3 предложения тёплой прозы\n\
         3. Используй имя в поздравлении\n\
         4. Без банальностей\n\
         5. Искренне и душевно\n\n\
         Только текст поздравления, без пояснений."
    )
}

pub fn card_style(gender: Gender) -> &'static str {
    match gender {
        Gender::Female => "красивые цветы, нежные тона, праздничная атмосфера",
        Gender::Male => "стильная мужская открытка, сдержанные тона, элегантный дизайн",
    }
}

pub fn card_prompt(name: &str, gender: Gender) -> String {
    format!(
        "Нарисуй праздничную открытку с днём рождения.\n\
         Стиль: {}\n\
         На открытке крупно напиши: \"{name}, с днём рождения!\"\n\
         Открытка должна быть яркой и праздничной.",
        card_style(gender)
    )
}

pub fn daily_greeting_message(name: &str, greeting: &str) -> String {
    format!("🎂 Сегодня день рождения: {name}\n\n{greeting}")
}

pub fn fallback_message(name: &str) -> String {
    format!("🎉 Сегодня день рождения:\n{name}\n\nНе забудь поздравить! 🎂")
}

/// `slot` 從 0 開始
pub fn card_caption(slot: usize, name: &str) -> String {
    format!("Открытка {} для {name}", slot + 1)
}

/// 月份摘要，依日期排序；`month` 為 1-12
pub fn month_summary_message(month: u32, entries: &[BirthdayEntry]) -> String {
    let index = (month.clamp(1, 12) - 1) as usize;

    if entries.is_empty() {
        return format!("📅 В {} нет дней рождения.", MONTHS_PREPOSITIONAL[index]);
    }

    let mut sorted: Vec<&BirthdayEntry> = entries.iter().collect();
    sorted.sort_by_key(|entry| entry.day);

    let mut lines = vec![format!("📅 {} — дни рождения:\n", MONTHS_NOMINATIVE[index])];
    lines.extend(
        sorted
            .iter()
            .map(|entry| format!("  • {} — {}", entry.day, entry.name)),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_include_name() {
        assert!(gender_prompt("Юра").contains("\"Юра\""));
        assert!(gender_prompt("Юра").contains("М или Ж"));
        assert!(greeting_prompt("Юра").contains("для Юра"));
        assert!(card_prompt("Юра", Gender::Male).contains("\"Юра, с днём рождения!\""));
    }

    #[test]
    fn test_card_style_depends_on_gender() {
        assert!(card_prompt("Нася", Gender::Female).contains("цветы"));
        assert!(card_prompt("Юра", Gender::Male).contains("сдержанные тона"));
    }

    #[test]
    fn test_card_caption_is_one_based() {
        assert_eq!(card_caption(0, "Мама"), "Открытка 1 для Мама");
        assert_eq!(card_caption(1, "Мама"), "Открытка 2 для Мама");
    }

    #[test]
    fn test_month_summary_sorted_by_day() {
        let entries = vec![
            BirthdayEntry {
                day: 21,
                month: 3,
                name: "Александра".to_string(),
            },
            BirthdayEntry {
                day: 2,
                month: 3,
                name: "Надежда".to_string(),
            },
        ];

        let text = month_summary_message(3, &entries);
        assert_eq!(
            text,
            "📅 Март — дни рождения:\n\n  • 2 — Надежда\n  • 21 — Александра"
        );
    }

    #[test]
    fn test_month_summary_empty() {
        assert_eq!(
            month_summary_message(1, &[]),
            "📅 В январе нет дней рождения."
        );
    }
}
