//! ISO 4217 currency definitions.
//!
//! Only the minor-unit scale matters to the calculation engine: it is the
//! precision every presented total is rounded to.

/// An ISO 4217 currency and the number of digits of its minor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyDef {
    pub code: &'static str,
    pub name: &'static str,
    /// Decimal digits of the minor unit (2 for EUR cents, 0 for JPY).
    pub scale: u32,
}

/// Look up a currency by its ISO 4217 code.
pub fn currency_def(code: &str) -> Option<&'static CurrencyDef> {
    CURRENCIES
        .binary_search_by(|c| c.code.cmp(code))
        .ok()
        .map(|i| &CURRENCIES[i])
}

/// Check whether `code` is a known ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    currency_def(code).is_some()
}

/// Minor-unit scale of a currency, if known.
pub fn currency_scale(code: &str) -> Option<u32> {
    currency_def(code).map(|c| c.scale)
}

const fn def(code: &'static str, name: &'static str, scale: u32) -> CurrencyDef {
    CurrencyDef { code, name, scale }
}

/// Sorted by code for binary search.
static CURRENCIES: &[CurrencyDef] = &[
    def("AED", "UAE Dirham", 2),
    def("ARS", "Argentine Peso", 2),
    def("AUD", "Australian Dollar", 2),
    def("BGN", "Bulgarian Lev", 2),
    def("BHD", "Bahraini Dinar", 3),
    def("BRL", "Brazilian Real", 2),
    def("CAD", "Canadian Dollar", 2),
    def("CHF", "Swiss Franc", 2),
    def("CLP", "Chilean Peso", 0),
    def("CNY", "Chinese Yuan", 2),
    def("COP", "Colombian Peso", 2),
    def("CZK", "Czech Koruna", 2),
    def("DKK", "Danish Krone", 2),
    def("EUR", "Euro", 2),
    def("GBP", "Pound Sterling", 2),
    def("HKD", "Hong Kong Dollar", 2),
    def("HUF", "Hungarian Forint", 2),
    def("IDR", "Indonesian Rupiah", 2),
    def("ILS", "Israeli Shekel", 2),
    def("INR", "Indian Rupee", 2),
    def("ISK", "Icelandic Krona", 0),
    def("JOD", "Jordanian Dinar", 3),
    def("JPY", "Japanese Yen", 0),
    def("KRW", "South Korean Won", 0),
    def("KWD", "Kuwaiti Dinar", 3),
    def("MXN", "Mexican Peso", 2),
    def("MYR", "Malaysian Ringgit", 2),
    def("NOK", "Norwegian Krone", 2),
    def("NZD", "New Zealand Dollar", 2),
    def("OMR", "Omani Rial", 3),
    def("PEN", "Peruvian Sol", 2),
    def("PHP", "Philippine Peso", 2),
    def("PLN", "Polish Zloty", 2),
    def("RON", "Romanian Leu", 2),
    def("SAR", "Saudi Riyal", 2),
    def("SEK", "Swedish Krona", 2),
    def("SGD", "Singapore Dollar", 2),
    def("THB", "Thai Baht", 2),
    def("TND", "Tunisian Dinar", 3),
    def("TRY", "Turkish Lira", 2),
    def("TWD", "New Taiwan Dollar", 2),
    def("UAH", "Ukrainian Hryvnia", 2),
    def("USD", "US Dollar", 2),
    def("VND", "Vietnamese Dong", 0),
    def("ZAR", "South African Rand", 2),
];
