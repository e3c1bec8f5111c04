//! Fixed bot texts (Telegram HTML parse mode).

pub const COMPANY_NAME: &str = "Надежные-решения.рф";
pub const MANAGER_PHONE: &str = "+7 (495) 123-45-67";
pub const CONTACT_EMAIL: &str = "info@надежные-решения.рф";

pub fn welcome(first_name: &str) -> String {
    let name = if first_name.trim().is_empty() { "друг" } else { first_name };
    format!(
        "👋 Здравствуйте, <b>{}</b>!\n\n\
        Я бот компании <b>{}</b>: фулфилмент для Wildberries, Ozon и Яндекс Маркета.\n\n\
        Что я умею:\n\
        • 🧮 рассчитать примерную стоимость услуг\n\
        • 📝 принять заявку для менеджера\n\
        • 🤖 ответить на вопросы о фулфилменте\n\n\
        Выберите действие 👇",
        escape_html(name),
        COMPANY_NAME
    )
}

pub const HELP: &str = "ℹ️ <b>Помощь</b>\n\n\
/start — главное меню\n\
/help — эта справка\n\n\
🧮 <b>Калькулятор</b>: выберите маркетплейс, укажите число заказов в месяц и нужные услуги.\n\
📝 <b>Заявка</b>: оставьте контакты, менеджер перезвонит.\n\
🤖 <b>AI-консультант</b>: задайте вопрос текстом.";

pub const COMPANY_INFO: &str = "🏢 <b>О компании</b>\n\n\
• Работаем с 2020 года\n\
• Более 500 довольных клиентов\n\
• Свыше 100,000 обработанных заказов в месяц\n\
• 99.5% точность выполнения заказов\n\n\
<b>Склады:</b>\n\
• Москва: 5,000 м²\n\
• Санкт-Петербург: 3,000 м²\n\
• Екатеринбург: 2,000 м²\n\
• Новосибирск: 2,500 м²";

pub const ADVANTAGES: &str = "⭐ <b>Преимущества</b>\n\n\
• Прозрачные тарифы без скрытых платежей\n\
• Скидки за объем до 15%\n\
• Отгрузки на склады маркетплейсов каждый день\n\
• Персональный менеджер\n\
• Отчеты и аналитика по остаткам";

pub const CALCULATOR_START: &str = "🧮 <b>Калькулятор стоимости</b>\n\nВыберите маркетплейс:";

pub fn orders_count_prompt(marketplace: &str) -> String {
    format!(
        "📊 Маркетплейс: <b>{}</b>\n\nСколько заказов в месяц вы планируете? Введите число:",
        escape_html(marketplace)
    )
}

pub const INVALID_ORDERS_COUNT: &str =
    "❌ Пожалуйста, введите корректное количество заказов (положительное число).";

pub const SERVICES_CHOICE: &str =
    "🛠 <b>Выберите услуги</b>\n\nНажмите на услугу, чтобы добавить или убрать ее, затем нажмите «Рассчитать стоимость».";

pub const APPLICATION_START: &str = "📝 <b>Заявка</b>\n\nКак к вам обращаться? Введите имя:";
pub const APPLICATION_CONTACT: &str = "📞 Укажите телефон или e-mail для связи:";
pub const APPLICATION_DESCRIPTION: &str =
    "✍️ Кратко опишите задачу: какие товары, маркетплейсы, объемы:";
pub const APPLICATION_COMPLETE: &str = "✅ <b>Заявка принята!</b>\n\n\
Менеджер свяжется с вами в течение 2 часов в рабочее время (Пн-Пт 9:00-18:00 МСК).";

pub const AI_INTRO: &str = "🤖 <b>AI-консультант</b>\n\n\
Отвечу на вопросы о тарифах, маркетплейсах и услугах фулфилмента.";
pub const AI_ASK: &str = "❓ Напишите ваш вопрос одним сообщением:";
pub const AI_EXAMPLES: &str = "💡 <b>Примеры вопросов</b>\n\n\
• Сколько стоит хранение на складе?\n\
• Чем отличается работа с Ozon и Wildberries?\n\
• Какая скидка при 5000 заказов в месяц?\n\
• Делаете ли вы маркировку Честный ЗНАК?";
pub const AI_THINKING: &str = "⏳ Думаю над ответом...";

pub fn assistant_unavailable() -> String {
    format!(
        "Извините, временные технические проблемы с AI-помощником. \
        Пожалуйста, воспользуйтесь калькулятором или свяжитесь с нашим менеджером: {}",
        MANAGER_PHONE
    )
}

pub const SESSION_EXPIRED: &str = "⌛ Эта кнопка устарела. Начнем заново 👇";
pub const TAP_A_BUTTON: &str = "Выберите действие кнопкой ниже 👇";

/// Escape user-provided text for Telegram HTML.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
