//! System prompt for the consultant, assembled from the tariff tables.

use crate::pricing::discount::VOLUME_TIERS;
use crate::pricing::CalculationResult;
use crate::tariffs::model::trim_number;
use crate::tariffs::TariffBook;
use crate::telegram::format::{group_thousands, percent};
use crate::telegram::messages::{COMPANY_NAME, CONTACT_EMAIL, MANAGER_PHONE};

/// Fixed knowledge the model answers from.
pub fn system_prompt(book: &TariffBook) -> String {
    let marketplaces: Vec<String> = book
        .marketplaces()
        .iter()
        .map(|m| {
            format!(
                "• {}: комиссия {}%, средний чек {} руб. Особенности: {}",
                m.name,
                percent(m.commission_rate),
                trim_number(m.average_order_value),
                m.features.join(", ")
            )
        })
        .collect();

    let services: Vec<String> = book
        .services()
        .iter()
        .map(|s| {
            format!(
                "• {}: {}. {}. Особенности: {}",
                s.name,
                s.rate_text(),
                s.description,
                s.features.join(", ")
            )
        })
        .collect();

    let discounts: Vec<String> = VOLUME_TIERS
        .iter()
        .rev()
        .map(|t| format!("• От {} заказов/месяц: {}% скидка", group_thousands(t.min_orders as f64), percent(t.rate)))
        .collect();

    format!(
        "Ты - AI-консультант компании \"{company}\", специализирующейся на услугах фулфилмента для российских маркетплейсов.

ИНФОРМАЦИЯ О КОМПАНИИ:
• Работаем с 2020 года
• Более 500 довольных клиентов
• Свыше 100,000 обработанных заказов в месяц
• 99.5% точность выполнения заказов
• Склады в Москве (5,000 м²), СПб (3,000 м²), Екатеринбурге (2,000 м²), Новосибирске (2,500 м²)

МАРКЕТПЛЕЙСЫ:
{marketplaces}

УСЛУГИ ФУЛФИЛМЕНТА:
{services}

СКИДКИ ЗА ОБЪЕМ (на комиссию маркетплейса):
{discounts}

КОНТАКТЫ:
• Сайт: {company}
• Телефон: {phone}
• Email: {email}
• Режим работы: Пн-Пт 9:00-18:00 (МСК)

ИНСТРУКЦИИ:
1. Отвечай на русском языке профессионально и дружелюбно
2. Предоставляй конкретную информацию о тарифах и услугах
3. Помогай рассчитать примерную стоимость
4. Предлагай подходящие решения под потребности клиента
5. Всегда предлагай использовать калькулятор бота или подать заявку для точного расчета
6. Если не знаешь ответ - честно говори об этом и предлагай связаться с менеджером
7. Избегай слишком длинных ответов - будь кратким и по делу",
        company = COMPANY_NAME,
        phone = MANAGER_PHONE,
        email = CONTACT_EMAIL,
        marketplaces = marketplaces.join("\n"),
        services = services.join("\n"),
        discounts = discounts.join("\n"),
    )
}

/// Block appended to the system prompt when the user has run the calculator.
pub fn user_context(calc: &CalculationResult) -> String {
    format!(
        "\n\nКОНТЕКСТ ПОЛЬЗОВАТЕЛЯ:\nПоследний расчет: {} маркетплейс, {} заказов/месяц, стоимость: {} руб/месяц",
        calc.marketplace,
        calc.orders_count,
        group_thousands(calc.total_cost)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingCalculator;
    use std::sync::Arc;

    #[test]
    fn prompt_lists_tables_and_discounts() {
        let book = TariffBook::bundled().unwrap();
        let prompt = system_prompt(&book);

        assert!(prompt.contains("• Wildberries: комиссия 15%, средний чек 1200 руб."));
        assert!(prompt.contains("• Хранение товаров: 5 руб/заказ."));
        assert!(prompt.contains("• Маркировка: 8 руб/товар."));
        assert!(prompt.contains("• От 1,000 заказов/месяц: 5% скидка"));
        assert!(prompt.contains("• От 10,000 заказов/месяц: 15% скидка"));
        let first = prompt.find("От 1,000").unwrap();
        let last = prompt.find("От 10,000").unwrap();
        assert!(first < last);
    }

    #[test]
    fn prompt_lists_contacts() {
        let prompt = system_prompt(&TariffBook::bundled().unwrap());
        assert!(prompt.contains("• Телефон: +7 (495) 123-45-67"));
        assert!(prompt.contains("• Email: info@надежные-решения.рф"));
    }

    #[test]
    fn context_block_mentions_last_calculation() {
        let book = Arc::new(TariffBook::bundled().unwrap());
        let calc = PricingCalculator::new(book).calculate("wildberries", 2000, ["storage", "packaging"]);
        let ctx = user_context(&calc);
        assert!(ctx.contains("wildberries маркетплейс, 2000 заказов/месяц, стоимость: 382,000 руб/месяц"));
    }
}
