//! Human-readable rendering of calculation results and catalogue cards.

use crate::pricing::discount::tier_for;
use crate::pricing::CalculationResult;
use crate::tariffs::model::{format_rate, trim_number, DEFAULT_COMMISSION_RATE};
use crate::tariffs::{MarketplaceTariff, ServiceTariff, TariffBook, TariffSource};

use super::messages::escape_html;

/// `1234567.4` → `1,234,567`. Rounds to whole rubles.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u128);

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if negative {
        out.insert(0, '-');
    }
    out
}

/// `0.15` → `15`, `0.125` → `12.5`.
pub fn percent(fraction: f64) -> String {
    trim_number((fraction * 10_000.0).round() / 100.0)
}

fn marketplace_label(book: &TariffBook, code: &str) -> String {
    book.marketplace_tariff(code)
        .map(MarketplaceTariff::label)
        .unwrap_or_else(|| code.to_string())
}

/// Volume discount annotation, empty below the first tier.
pub fn volume_discount_note(orders_count: i64) -> Option<String> {
    tier_for(orders_count).map(|t| {
        format!(
            "🎉 Скидка за объем: {}% (от {} заказов)",
            percent(t.rate),
            group_thousands(t.min_orders as f64)
        )
    })
}

/// Full result message for the chat.
pub fn format_calculation_result(result: &CalculationResult, book: &TariffBook) -> String {
    let mp_label = escape_html(&marketplace_label(book, &result.marketplace));
    let mut text = format!(
        "💰 <b>Результат расчета стоимости</b>\n\n\
        <b>📊 Параметры расчета:</b>\n\
        • Маркетплейс: {}\n\
        • Количество заказов в месяц: {}\n\n\
        <b>🛠 Выбранные услуги:</b>\n",
        mp_label,
        group_thousands(result.orders_count as f64),
    );

    for line in &result.services {
        text.push_str(&format!(
            "  • {}: {} руб ({})\n",
            escape_html(&line.name),
            group_thousands(line.cost),
            format_rate(line.rate, line.rate_type),
        ));
    }

    text.push_str(&format!(
        "\n<b>💸 Расчет стоимости:</b>\n\
        • Услуги фулфилмента: {} руб/мес\n\
        • Комиссии маркетплейса: {} руб/мес\n\n\
        <b>🎯 ИТОГО: {} руб/мес</b>\n\
        <b>📈 Стоимость за заказ: {:.0} руб</b>\n\n\
        <b>💡 Дополнительная информация:</b>\n",
        group_thousands(result.total_service_cost),
        group_thousands(result.marketplace_commission),
        group_thousands(result.total_cost),
        result.cost_per_order,
    ));

    if let Some(note) = volume_discount_note(result.orders_count) {
        text.push_str(&format!("• {}\n", note));
    }
    let base_rate = book
        .marketplace_tariff(&result.marketplace)
        .map_or(DEFAULT_COMMISSION_RATE, |m| m.commission_rate);
    text.push_str(&format!("• Комиссия {}: {}%\n", mp_label, percent(base_rate)));

    text.push_str(
        "\n<b>⚡ Что дальше?</b>\n\
        • Подайте заявку для получения персонального предложения\n\
        • Наш менеджер свяжется с вами в течение 2 часов\n\
        • Обсудим детали и запустим сотрудничество\n\n\
        <i>* Расчет является примерным. Точная стоимость определяется после анализа ваших потребностей.</i>",
    );
    text
}

/// Catalogue card for a marketplace.
pub fn format_marketplace_info(mp: &MarketplaceTariff) -> String {
    let mut text = format!(
        "<b>{}</b>\n\n<b>Условия работы:</b>\n• Комиссия: {}%\n• Средний чек: {} руб\n\n<b>Особенности интеграции:</b>\n",
        escape_html(&mp.label()),
        percent(mp.commission_rate),
        group_thousands(mp.average_order_value),
    );
    for feature in &mp.features {
        text.push_str(&format!("• {}\n", escape_html(feature)));
    }
    text
}

/// Catalogue card for a service: rate, description and features.
pub fn format_service_description(svc: &ServiceTariff) -> String {
    let mut text = format!(
        "<b>{}</b>\n💰 {}\n\n{}\n",
        escape_html(&svc.label()),
        svc.rate_text(),
        escape_html(&svc.description),
    );
    if !svc.features.is_empty() {
        text.push_str("\n<b>Особенности:</b>\n");
        for feature in &svc.features {
            text.push_str(&format!("• {}\n", escape_html(feature)));
        }
    }
    text
}

/// Overview of all services, shown by the "our services" button.
pub fn format_services_overview(book: &TariffBook) -> String {
    let mut text = String::from("🛠 <b>Наши услуги</b>\n");
    for svc in book.services() {
        text.push('\n');
        text.push_str(&format_service_description(svc));
    }
    text.push_str("\nТочную стоимость под ваш объем посчитает 🧮 калькулятор.");
    text
}
