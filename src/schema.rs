//! schema.org JSON-LD generation.
//!
//! Every schema type in scope is a [`SchemaVariant`]; [`SchemaGenerator::node`] is the
//! single dispatch point from variant to builder, and [`SchemaPlan::for_content_type`]
//! maps page types onto variants. Builders always emit `@type` and the variant's
//! required properties, filling gaps from [`SiteConfig`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::canonical::UrlCanonicalizer;
use crate::config::{PostalAddress, SiteConfig};
use crate::meta_tags::to_iso8601;
use crate::models::{
    Breadcrumb, ContentType, FaqItem, IssueSeverity, IssueType, PageContent, SchemaDocument,
    SeoIssue, ValidationReport,
};

pub const SCHEMA_CONTEXT: &str = "https://schema.org";
const MAX_HEADLINE_CHARS: usize = 110;
const MIN_DESCRIPTION_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVariant {
    Organization,
    SoftwareApplication,
    LocalBusiness,
    Article,
    Product,
    FaqPage,
    BreadcrumbList,
    WebSite,
}

impl SchemaVariant {
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaVariant::Organization => "Organization",
            SchemaVariant::SoftwareApplication => "SoftwareApplication",
            SchemaVariant::LocalBusiness => "LocalBusiness",
            SchemaVariant::Article => "Article",
            SchemaVariant::Product => "Product",
            SchemaVariant::FaqPage => "FAQPage",
            SchemaVariant::BreadcrumbList => "BreadcrumbList",
            SchemaVariant::WebSite => "WebSite",
        }
    }

    /// Maps a schema.org `@type` (including common subtypes) back to its variant.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "Organization" | "Corporation" => Some(SchemaVariant::Organization),
            "SoftwareApplication" | "WebApplication" | "MobileApplication" => {
                Some(SchemaVariant::SoftwareApplication)
            }
            "LocalBusiness" | "Restaurant" | "FoodEstablishment" => {
                Some(SchemaVariant::LocalBusiness)
            }
            "Article" | "BlogPosting" | "NewsArticle" => Some(SchemaVariant::Article),
            "Product" => Some(SchemaVariant::Product),
            "FAQPage" => Some(SchemaVariant::FaqPage),
            "BreadcrumbList" => Some(SchemaVariant::BreadcrumbList),
            "WebSite" => Some(SchemaVariant::WebSite),
            _ => None,
        }
    }

    pub fn required_properties(&self) -> &'static [&'static str] {
        match self {
            SchemaVariant::Organization => &["name", "url"],
            SchemaVariant::SoftwareApplication => {
                &["name", "applicationCategory", "operatingSystem", "offers"]
            }
            SchemaVariant::LocalBusiness => &["name", "address"],
            SchemaVariant::Article => &["headline", "author", "publisher"],
            SchemaVariant::Product => &["name", "offers"],
            SchemaVariant::FaqPage => &["mainEntity"],
            SchemaVariant::BreadcrumbList => &["itemListElement"],
            SchemaVariant::WebSite => &["name", "url"],
        }
    }

    pub fn recommended_properties(&self) -> &'static [&'static str] {
        match self {
            SchemaVariant::Organization => &["logo", "sameAs"],
            SchemaVariant::SoftwareApplication => &["description", "aggregateRating"],
            SchemaVariant::LocalBusiness => &["telephone", "openingHours", "url"],
            SchemaVariant::Article => &["image", "datePublished", "dateModified"],
            SchemaVariant::Product => &["image", "description", "brand"],
            SchemaVariant::FaqPage | SchemaVariant::BreadcrumbList => &[],
            SchemaVariant::WebSite => &["potentialAction"],
        }
    }
}

/// What a content type renders as: one node, or the homepage `@graph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaPlan {
    Single(SchemaVariant),
    HomepageGraph,
}

impl SchemaPlan {
    pub fn for_content_type(content_type: ContentType) -> Option<Self> {
        match content_type {
            ContentType::Homepage => Some(SchemaPlan::HomepageGraph),
            ContentType::BlogPost => Some(SchemaPlan::Single(SchemaVariant::Article)),
            ContentType::ProductPage => Some(SchemaPlan::Single(SchemaVariant::Product)),
            ContentType::LandingPage => {
                Some(SchemaPlan::Single(SchemaVariant::SoftwareApplication))
            }
            ContentType::CategoryPage => None,
        }
    }
}

/// Loosely-typed builder input. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaData {
    pub name: Option<String>,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub logo: Option<String>,
    pub author: Option<String>,
    pub date_published: Option<String>,
    pub date_modified: Option<String>,
    pub keywords: Vec<String>,
    pub price: Option<String>,
    pub price_currency: Option<String>,
    pub availability: Option<String>,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub rating_value: Option<f64>,
    pub review_count: Option<u64>,
    pub application_category: Option<String>,
    pub operating_system: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub address: Option<PostalAddress>,
    pub opening_hours: Vec<String>,
    pub price_range: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub same_as: Vec<String>,
    pub faqs: Vec<FaqItem>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

impl SchemaData {
    pub fn from_page(page: &PageContent) -> Self {
        let text = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        Self {
            headline: text(&page.title),
            description: text(&page.description),
            url: text(&page.url),
            image: page.image.as_deref().and_then(text),
            author: page.author.as_deref().and_then(text),
            date_published: page.published_date.clone(),
            date_modified: page.modified_date.clone(),
            keywords: page.keyword_terms(),
            faqs: page.faqs.clone(),
            breadcrumbs: page.breadcrumbs.clone(),
            ..Default::default()
        }
    }

    /// Organization-level fields only; page-level description and URL stay with the site.
    fn organization_fields(&self) -> Self {
        Self {
            name: self.name.clone(),
            logo: self.logo.clone(),
            telephone: self.telephone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            same_as: self.same_as.clone(),
            ..Default::default()
        }
    }
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn insert_str(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
}

fn address_node(address: &PostalAddress) -> Value {
    let mut map = Map::new();
    map.insert("@type".to_string(), json!("PostalAddress"));
    for (key, value) in [
        ("streetAddress", &address.street_address),
        ("addressLocality", &address.address_locality),
        ("addressRegion", &address.address_region),
        ("postalCode", &address.postal_code),
        ("addressCountry", &address.address_country),
    ] {
        if !value.trim().is_empty() {
            map.insert(key.to_string(), json!(value.trim()));
        }
    }
    Value::Object(map)
}

fn with_context(node: Value) -> SchemaDocument {
    match node {
        Value::Object(fields) => {
            let mut map = Map::new();
            map.insert("@context".to_string(), json!(SCHEMA_CONTEXT));
            map.extend(fields);
            SchemaDocument(Value::Object(map))
        }
        other => SchemaDocument(other),
    }
}

/// Builds schema.org documents from loosely-typed data.
pub struct SchemaGenerator {
    config: Arc<SiteConfig>,
    canonicalizer: UrlCanonicalizer,
}

impl SchemaGenerator {
    pub fn new(config: Arc<SiteConfig>) -> Self {
        Self {
            canonicalizer: UrlCanonicalizer::new(config.clone()),
            config,
        }
    }

    /// `None` only when the content type has no schema mapping.
    pub fn generate_schema(
        &self,
        content_type: ContentType,
        data: &SchemaData,
    ) -> Option<SchemaDocument> {
        match SchemaPlan::for_content_type(content_type) {
            Some(SchemaPlan::HomepageGraph) => Some(self.generate_homepage_schema(data)),
            Some(SchemaPlan::Single(variant)) => Some(self.generate(variant, data)),
            None => {
                tracing::debug!(content_type = %content_type, "No schema mapping for content type");
                None
            }
        }
    }

    pub fn generate(&self, variant: SchemaVariant, data: &SchemaData) -> SchemaDocument {
        with_context(self.node(variant, data))
    }

    pub fn node(&self, variant: SchemaVariant, data: &SchemaData) -> Value {
        match variant {
            SchemaVariant::Organization => self.organization_node(data),
            SchemaVariant::SoftwareApplication => self.software_node(data),
            SchemaVariant::LocalBusiness => self.local_business_node(data),
            SchemaVariant::Article => self.article_node(data),
            SchemaVariant::Product => self.product_node(data),
            SchemaVariant::FaqPage => faq_node(&data.faqs),
            SchemaVariant::BreadcrumbList => self.breadcrumb_node(&data.breadcrumbs),
            SchemaVariant::WebSite => self.website_node(),
        }
    }

    pub fn generate_organization_schema(&self, data: &SchemaData) -> SchemaDocument {
        self.generate(SchemaVariant::Organization, data)
    }

    pub fn generate_software_application_schema(&self, data: &SchemaData) -> SchemaDocument {
        self.generate(SchemaVariant::SoftwareApplication, data)
    }

    pub fn generate_local_business_schema(&self, data: &SchemaData) -> SchemaDocument {
        self.generate(SchemaVariant::LocalBusiness, data)
    }

    pub fn generate_article_schema(&self, data: &SchemaData) -> SchemaDocument {
        self.generate(SchemaVariant::Article, data)
    }

    pub fn generate_product_schema(&self, data: &SchemaData) -> SchemaDocument {
        self.generate(SchemaVariant::Product, data)
    }

    pub fn generate_faq_schema(&self, faqs: &[FaqItem]) -> SchemaDocument {
        with_context(faq_node(faqs))
    }

    pub fn generate_breadcrumb_schema(&self, breadcrumbs: &[Breadcrumb]) -> SchemaDocument {
        with_context(self.breadcrumb_node(breadcrumbs))
    }

    pub fn generate_website_schema(&self) -> SchemaDocument {
        with_context(self.website_node())
    }

    /// `@graph` of Organization, WebSite and SoftwareApplication, plus FAQPage and
    /// BreadcrumbList only when the corresponding data is non-empty.
    pub fn generate_homepage_schema(&self, data: &SchemaData) -> SchemaDocument {
        let mut graph = vec![
            self.organization_node(&data.organization_fields()),
            self.website_node(),
            self.software_node(data),
        ];
        if !data.faqs.is_empty() {
            graph.push(faq_node(&data.faqs));
        }
        if !data.breadcrumbs.is_empty() {
            graph.push(self.breadcrumb_node(&data.breadcrumbs));
        }

        SchemaDocument(json!({
            "@context": SCHEMA_CONTEXT,
            "@graph": graph,
        }))
    }

    fn base(&self) -> String {
        self.config.base_str()
    }

    fn node_id(&self, fragment: &str) -> String {
        format!("{}/#{}", self.base(), fragment)
    }

    fn page_url(&self, data: &SchemaData) -> String {
        match filled(&data.url) {
            Some(url) => self.canonicalizer.canonicalize(url),
            None => self.canonicalizer.canonicalize(""),
        }
    }

    fn image_url(&self, data: &SchemaData) -> String {
        filled(&data.image)
            .map(|img| self.canonicalizer.resolve(img).to_string())
            .unwrap_or_else(|| self.config.default_image.clone())
    }

    fn logo_node(&self, data: &SchemaData) -> Value {
        let logo = filled(&data.logo).unwrap_or(&self.config.logo);
        json!({ "@type": "ImageObject", "url": logo })
    }

    fn organization_node(&self, data: &SchemaData) -> Value {
        let org = &self.config.organization;
        let name = filled(&data.name).unwrap_or(&self.config.site_name);
        let url = filled(&data.url)
            .map(|u| self.canonicalizer.canonicalize(u))
            .unwrap_or_else(|| self.canonicalizer.canonicalize(""));

        let mut map = Map::new();
        map.insert("@type".to_string(), json!("Organization"));
        map.insert("@id".to_string(), json!(self.node_id("organization")));
        map.insert("name".to_string(), json!(name));
        map.insert("url".to_string(), json!(url));
        map.insert("logo".to_string(), self.logo_node(data));
        map.insert("brand".to_string(), json!({ "@type": "Brand", "name": name }));
        insert_str(
            &mut map,
            "description",
            filled(&data.description).or(Some(org.description.as_str()).filter(|d| !d.is_empty())),
        );
        insert_str(&mut map, "legalName", filled(&org.legal_name));
        insert_str(&mut map, "foundingDate", filled(&org.founding_date));

        let email = filled(&data.email).or(filled(&org.email));
        let telephone = filled(&data.telephone).or(filled(&org.telephone));
        insert_str(&mut map, "email", email);
        insert_str(&mut map, "telephone", telephone);
        if email.is_some() || telephone.is_some() {
            let mut contact = Map::new();
            contact.insert("@type".to_string(), json!("ContactPoint"));
            contact.insert("contactType".to_string(), json!("customer support"));
            insert_str(&mut contact, "email", email);
            insert_str(&mut contact, "telephone", telephone);
            map.insert("contactPoint".to_string(), Value::Object(contact));
        }

        if let Some(address) = data.address.as_ref().or(org.address.as_ref()) {
            map.insert("address".to_string(), address_node(address));
        }

        let same_as = if data.same_as.is_empty() {
            &org.same_as
        } else {
            &data.same_as
        };
        if !same_as.is_empty() {
            map.insert("sameAs".to_string(), json!(same_as));
        }

        Value::Object(map)
    }

    fn website_node(&self) -> Value {
        let base = self.base();
        json!({
            "@type": "WebSite",
            "@id": self.node_id("website"),
            "name": self.config.site_name,
            "url": self.canonicalizer.canonicalize(""),
            "inLanguage": self.config.locale.replace('_', "-"),
            "publisher": { "@id": self.node_id("organization") },
            "potentialAction": {
                "@type": "SearchAction",
                "target": format!("{}/search?q={{search_term_string}}", base),
                "query-input": "required name=search_term_string",
            },
        })
    }

    fn offer_node(&self, data: &SchemaData, url: &str) -> Value {
        let software = &self.config.software;
        let availability = filled(&data.availability).unwrap_or("InStock");
        let availability = if availability.starts_with("http") {
            availability.to_string()
        } else {
            format!("https://schema.org/{}", availability)
        };

        json!({
            "@type": "Offer",
            "price": filled(&data.price).unwrap_or(&software.price),
            "priceCurrency": filled(&data.price_currency).unwrap_or(&software.price_currency),
            "availability": availability,
            "url": url,
        })
    }

    fn rating_node(&self, data: &SchemaData) -> Option<Value> {
        let software = &self.config.software;
        let value = data.rating_value.or(software.rating_value)?;
        let count = data.review_count.or(software.rating_count).unwrap_or(1);
        Some(json!({
            "@type": "AggregateRating",
            "ratingValue": value,
            "ratingCount": count,
            "bestRating": 5,
        }))
    }

    fn software_node(&self, data: &SchemaData) -> Value {
        let software = &self.config.software;
        let url = self.page_url(data);

        let mut map = Map::new();
        map.insert("@type".to_string(), json!("SoftwareApplication"));
        map.insert("@id".to_string(), json!(self.node_id("software")));
        map.insert(
            "name".to_string(),
            json!(filled(&data.name).unwrap_or(&self.config.site_name)),
        );
        map.insert(
            "applicationCategory".to_string(),
            json!(filled(&data.application_category).unwrap_or(&software.application_category)),
        );
        map.insert(
            "operatingSystem".to_string(),
            json!(filled(&data.operating_system).unwrap_or(&software.operating_system)),
        );
        map.insert("offers".to_string(), self.offer_node(data, &url));
        map.insert("url".to_string(), json!(url));
        map.insert("image".to_string(), json!(self.image_url(data)));
        insert_str(
            &mut map,
            "description",
            filled(&data.description).or(Some(self.config.organization.description.as_str())
                .filter(|d| !d.is_empty())),
        );
        if let Some(rating) = self.rating_node(data) {
            map.insert("aggregateRating".to_string(), rating);
        }
        map.insert(
            "publisher".to_string(),
            json!({ "@id": self.node_id("organization") }),
        );

        Value::Object(map)
    }

    fn local_business_node(&self, data: &SchemaData) -> Value {
        let org = &self.config.organization;
        let country = self
            .config
            .locale
            .rsplit(['_', '-'])
            .next()
            .unwrap_or("")
            .to_uppercase();
        let fallback_address = PostalAddress {
            address_country: country,
            ..Default::default()
        };
        let address = data
            .address
            .as_ref()
            .or(org.address.as_ref())
            .unwrap_or(&fallback_address);

        let mut map = Map::new();
        map.insert("@type".to_string(), json!("LocalBusiness"));
        map.insert("@id".to_string(), json!(self.node_id("localbusiness")));
        map.insert(
            "name".to_string(),
            json!(filled(&data.name).unwrap_or(&self.config.site_name)),
        );
        map.insert("address".to_string(), address_node(address));
        map.insert("url".to_string(), json!(self.page_url(data)));
        map.insert("image".to_string(), json!(self.image_url(data)));
        insert_str(
            &mut map,
            "telephone",
            filled(&data.telephone).or(filled(&org.telephone)),
        );
        insert_str(&mut map, "email", filled(&data.email).or(filled(&org.email)));
        insert_str(&mut map, "priceRange", filled(&data.price_range));
        if !data.opening_hours.is_empty() {
            map.insert("openingHours".to_string(), json!(data.opening_hours));
        }
        if let (Some(latitude), Some(longitude)) = (data.latitude, data.longitude) {
            map.insert(
                "geo".to_string(),
                json!({ "@type": "GeoCoordinates", "latitude": latitude, "longitude": longitude }),
            );
        }

        Value::Object(map)
    }

    fn article_node(&self, data: &SchemaData) -> Value {
        let url = self.page_url(data);
        let fallback_headline = format!("{} Blog", self.config.site_name);
        let headline: String = filled(&data.headline)
            .or(filled(&data.name))
            .unwrap_or(&fallback_headline)
            .chars()
            .take(MAX_HEADLINE_CHARS)
            .collect();

        let author = match filled(&data.author) {
            Some(name) => json!({ "@type": "Person", "name": name }),
            None => json!({ "@type": "Organization", "name": self.config.site_name }),
        };

        let mut map = Map::new();
        map.insert("@type".to_string(), json!("Article"));
        map.insert("headline".to_string(), json!(headline));
        map.insert("author".to_string(), author);
        map.insert(
            "publisher".to_string(),
            json!({
                "@type": "Organization",
                "name": self.config.site_name,
                "logo": self.logo_node(data),
            }),
        );
        map.insert("image".to_string(), json!(self.image_url(data)));
        map.insert("url".to_string(), json!(url));
        map.insert(
            "mainEntityOfPage".to_string(),
            json!({ "@type": "WebPage", "@id": url }),
        );
        insert_str(&mut map, "description", filled(&data.description));

        let published = filled(&data.date_published).and_then(to_iso8601);
        let modified = filled(&data.date_modified)
            .and_then(to_iso8601)
            .or_else(|| published.clone());
        insert_str(&mut map, "datePublished", published.as_deref());
        insert_str(&mut map, "dateModified", modified.as_deref());

        if !data.keywords.is_empty() {
            map.insert("keywords".to_string(), json!(data.keywords.join(", ")));
        }

        Value::Object(map)
    }

    fn product_node(&self, data: &SchemaData) -> Value {
        let url = self.page_url(data);
        let name = filled(&data.name)
            .or(filled(&data.headline))
            .unwrap_or(&self.config.site_name);
        let brand = filled(&data.brand).unwrap_or(&self.config.site_name);

        let mut map = Map::new();
        map.insert("@type".to_string(), json!("Product"));
        map.insert("name".to_string(), json!(name));
        map.insert("image".to_string(), json!(self.image_url(data)));
        map.insert("brand".to_string(), json!({ "@type": "Brand", "name": brand }));
        map.insert("offers".to_string(), self.offer_node(data, &url));
        map.insert("url".to_string(), json!(url));
        insert_str(&mut map, "description", filled(&data.description));
        insert_str(&mut map, "sku", filled(&data.sku));
        if let Some(rating) = self.rating_node(data) {
            map.insert("aggregateRating".to_string(), rating);
        }

        Value::Object(map)
    }

    fn breadcrumb_node(&self, breadcrumbs: &[Breadcrumb]) -> Value {
        let items: Vec<Value> = breadcrumbs
            .iter()
            .enumerate()
            .map(|(index, crumb)| {
                json!({
                    "@type": "ListItem",
                    "position": index + 1,
                    "name": crumb.name.trim(),
                    "item": self.canonicalizer.canonicalize(&crumb.url),
                })
            })
            .collect();

        json!({
            "@type": "BreadcrumbList",
            "itemListElement": items,
        })
    }
}

fn faq_node(faqs: &[FaqItem]) -> Value {
    let questions: Vec<Value> = faqs
        .iter()
        .map(|faq| {
            json!({
                "@type": "Question",
                "name": faq.question.trim(),
                "acceptedAnswer": {
                    "@type": "Answer",
                    "text": faq.answer.trim(),
                },
            })
        })
        .collect();

    json!({
        "@type": "FAQPage",
        "mainEntity": questions,
    })
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

fn issue(severity: IssueSeverity, issue_type: IssueType, message: String) -> SeoIssue {
    SeoIssue {
        severity,
        issue_type,
        message,
    }
}

/// Advisory validation of any JSON value claiming to be JSON-LD. Never panics;
/// malformed input scores zero.
pub fn validate_schema(schema: &Value) -> ValidationReport {
    let Some(root) = schema.as_object() else {
        return ValidationReport {
            is_valid: false,
            issues: vec![issue(
                IssueSeverity::Error,
                IssueType::MalformedSchema,
                "Schema must be a JSON object".to_string(),
            )],
            warnings: Vec::new(),
            score: 0,
        };
    };

    let mut findings = Vec::new();

    let context_ok = root
        .get("@context")
        .and_then(Value::as_str)
        .is_some_and(|ctx| ctx.contains("schema.org"));
    if !context_ok {
        findings.push(issue(
            IssueSeverity::Error,
            IssueType::MissingSchemaContext,
            "Missing or invalid @context (expected https://schema.org)".to_string(),
        ));
    }

    match root.get("@graph") {
        Some(Value::Array(nodes)) if !nodes.is_empty() => {
            for (index, node) in nodes.iter().enumerate() {
                validate_node(node, &format!("@graph[{}]", index), &mut findings);
            }
        }
        Some(_) => findings.push(issue(
            IssueSeverity::Error,
            IssueType::MalformedSchema,
            "@graph must be a non-empty array".to_string(),
        )),
        None => validate_node(schema, "root", &mut findings),
    }

    ValidationReport::from_findings(findings)
}

fn validate_node(node: &Value, location: &str, findings: &mut Vec<SeoIssue>) {
    let Some(map) = node.as_object() else {
        findings.push(issue(
            IssueSeverity::Error,
            IssueType::MalformedSchema,
            format!("{}: node must be a JSON object", location),
        ));
        return;
    };

    let Some(type_name) = map
        .get("@type")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
    else {
        findings.push(issue(
            IssueSeverity::Error,
            IssueType::MissingSchemaType,
            format!("{}: missing @type", location),
        ));
        return;
    };

    let Some(variant) = SchemaVariant::from_type_name(type_name) else {
        findings.push(issue(
            IssueSeverity::Warning,
            IssueType::UnknownSchemaType,
            format!("{}: no validation rules for @type '{}'", location, type_name),
        ));
        return;
    };

    for property in variant.required_properties() {
        if is_blank(map.get(*property)) {
            findings.push(issue(
                IssueSeverity::Error,
                IssueType::MissingRequiredProperty,
                format!("{} ({}): missing required property '{}'", location, type_name, property),
            ));
        }
    }

    for property in variant.recommended_properties() {
        if is_blank(map.get(*property)) {
            findings.push(issue(
                IssueSeverity::Info,
                IssueType::MissingRequiredProperty,
                format!("{} ({}): missing recommended property '{}'", location, type_name, property),
            ));
        }
    }

    for property in ["name", "headline"] {
        if let Some(value) = map.get(property).and_then(Value::as_str)
            && value.trim().chars().count() < 3
        {
            findings.push(issue(
                IssueSeverity::Warning,
                IssueType::ShortPropertyValue,
                format!("{} ({}): '{}' is too short", location, type_name, property),
            ));
        }
    }
    if let Some(description) = map.get("description").and_then(Value::as_str)
        && description.trim().chars().count() < MIN_DESCRIPTION_CHARS
    {
        findings.push(issue(
            IssueSeverity::Warning,
            IssueType::ShortPropertyValue,
            format!(
                "{} ({}): description is shorter than {} chars",
                location, type_name, MIN_DESCRIPTION_CHARS
            ),
        ));
    }

    match variant {
        SchemaVariant::FaqPage => validate_faq_entries(map, location, findings),
        SchemaVariant::BreadcrumbList => validate_breadcrumb_items(map, location, findings),
        _ => {}
    }
}

fn validate_faq_entries(map: &Map<String, Value>, location: &str, findings: &mut Vec<SeoIssue>) {
    let Some(questions) = map.get("mainEntity").and_then(Value::as_array) else {
        return;
    };
    for (index, question) in questions.iter().enumerate() {
        let name_ok = !is_blank(question.get("name"));
        let answer_ok = !is_blank(question.get("acceptedAnswer").and_then(|a| a.get("text")));
        if !name_ok || !answer_ok {
            findings.push(issue(
                IssueSeverity::Error,
                IssueType::MissingRequiredProperty,
                format!(
                    "{} (FAQPage): question {} needs a name and an answer text",
                    location,
                    index + 1
                ),
            ));
        }
    }
}

fn validate_breadcrumb_items(
    map: &Map<String, Value>,
    location: &str,
    findings: &mut Vec<SeoIssue>,
) {
    let Some(items) = map.get("itemListElement").and_then(Value::as_array) else {
        return;
    };
    for (index, item) in items.iter().enumerate() {
        let position = item.get("position").and_then(Value::as_u64);
        if position != Some(index as u64 + 1) {
            findings.push(issue(
                IssueSeverity::Error,
                IssueType::MalformedSchema,
                format!(
                    "{} (BreadcrumbList): item {} has position {:?}",
                    location,
                    index + 1,
                    position
                ),
            ));
        }
        let absolute = item
            .get("item")
            .and_then(Value::as_str)
            .is_some_and(|u| url::Url::parse(u).is_ok());
        if !absolute {
            findings.push(issue(
                IssueSeverity::Error,
                IssueType::MalformedSchema,
                format!(
                    "{} (BreadcrumbList): item {} needs an absolute URL",
                    location,
                    index + 1
                ),
            ));
        }
    }
}
