use crate::html::escape;
use crate::illustrator::IllustratedProduct;
use crate::models::budget::Budget;
use crate::models::spending_log::SpendingLogEntry;
use crate::report::PurposeTotal;

pub const IMAGE_URL_PREFIX: &str = "/static/crawl_images";

pub struct IndexPage {}
pub struct FormsPage {}
pub struct RegisterPage {}
pub struct LoginPage {}
pub struct ProductsPage {}
pub struct DashboardPage {}
pub struct StatsPage {}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>
         <html>
           <head>
             <meta charset=\"utf-8\">
             <title>Thriftify | {title}</title>
             <style>
               body {{
                 font-family: Arial, sans-serif;
                 margin: 0 auto;
                 max-width: 960px;
                 padding: 0 16px;
               }}
               nav a {{
                 margin-right: 12px;
               }}
               .notice {{
                 color: #a15c00;
               }}
               .products {{
                 display: flex;
                 flex-wrap: wrap;
                 gap: 16px;
               }}
               .product {{
                 border: 1px solid #ddd;
                 padding: 8px;
                 width: 280px;
               }}
               .product img {{
                 max-width: 100%;
               }}
               .modal {{
                 display: none;
                 position: fixed;
                 left: 0;
                 top: 0;
                 width: 100%;
                 height: 100%;
                 background-color: rgba(0, 0, 0, 0.4);
               }}
               .modal-content {{
                 background: #fff;
                 margin: 15% auto;
                 padding: 16px;
                 width: 320px;
               }}
             </style>
           </head>
           <body>
             <nav>
               <a href=\"/\">Home</a>
               <a href=\"/forms\">Find products</a>
               <a href=\"/dashboard\">Dashboard</a>
               <a href=\"/stats\">Stats</a>
               <a href=\"/login\">Log in</a>
               <a href=\"/register\">Register</a>
               <a href=\"/logout\">Log out</a>
             </nav>
             {body}
           </body>
         </html>"
    )
}

impl IndexPage {
    pub fn generate() -> String {
        layout(
            "Home",
            "<h1>Thriftify</h1>
             <h3>Set a budget, log what you spend, and find products that fit your price \
             range.</h3>",
        )
    }
}

impl FormsPage {
    pub fn generate() -> String {
        layout(
            "Find products",
            "<h1>Find products</h1>
             <form action=\"/forms\" method=\"post\">
               <label for=\"topic\">What are you looking for?</label>
               <input type=\"text\" id=\"topic\" name=\"topic\" required>
               <label for=\"budget\">Price range</label>
               <input type=\"text\" id=\"budget\" name=\"budget\" required>
               <button type=\"submit\">Search</button>
             </form>",
        )
    }
}

impl RegisterPage {
    pub fn generate() -> String {
        layout(
            "Register",
            "<h1>Create an account</h1>
             <form action=\"/register\" method=\"post\">
               <input type=\"text\" name=\"username\" placeholder=\"Username\" required>
               <input type=\"password\" name=\"password\" placeholder=\"Password\" required>
               <button type=\"submit\">Register</button>
             </form>",
        )
    }
}

impl LoginPage {
    pub fn generate() -> String {
        layout(
            "Log in",
            "<h1>Log in</h1>
             <form action=\"/login\" method=\"post\">
               <input type=\"text\" name=\"username\" placeholder=\"Username\" required>
               <input type=\"password\" name=\"password\" placeholder=\"Password\" required>
               <button type=\"submit\">Log in</button>
             </form>",
        )
    }
}

impl ProductsPage {
    pub fn generate(products: &[IllustratedProduct], notice: Option<&str>) -> String {
        let mut body = String::from("<h1>Products</h1>");

        if let Some(notice) = notice {
            body.push_str(&format!("<p class=\"notice\">{}</p>", escape(notice)));
        }

        body.push_str("<div class=\"products\">");

        for item in products {
            let image = match &item.image_path {
                Some(path) => format!(
                    "<img src=\"{IMAGE_URL_PREFIX}/{}\" alt=\"{}\">",
                    escape(path),
                    escape(&item.product.name),
                ),
                None => String::new(),
            };

            body.push_str(&format!(
                "<div class=\"product\">{image}<h3>{}</h3><p>{}</p></div>",
                escape(&item.product.name),
                escape(&item.product.description),
            ));
        }

        body.push_str("</div>");

        layout("Products", &body)
    }
}

impl DashboardPage {
    pub fn generate(
        username: &str,
        current_budget: Option<&Budget>,
        entries: &[SpendingLogEntry],
    ) -> String {
        let summary = match current_budget {
            Some(budget) => {
                let mut rows = String::new();
                for entry in entries {
                    rows.push_str(&format!(
                        "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                        entry.spent_date,
                        entry.spent,
                        escape(&entry.purpose),
                    ));
                }

                format!(
                    "<h3>Current budget: ${} from {} to {} ({} days)</h3>
                     <table>
                       <tr><th>Date</th><th>Spent</th><th>Purpose</th></tr>
                       {rows}
                     </table>",
                    budget.budget_amount,
                    budget.start_date,
                    budget.end_date(),
                    budget.duration_days,
                )
            }
            None => String::from("<h3>You don't have a budget yet.</h3>"),
        };

        let body = format!(
            "<h1>{}'s dashboard</h1>
             {summary}
             <select id=\"settings\">
               <option value=\"\">Current budget</option>
             </select>
             <canvas id=\"myChart\"></canvas>
             <button id=\"createBudgetBtn\">Create budget</button>
             <button id=\"logSpendingBtn\">Log spending</button>

             <div id=\"budgetModal\" class=\"modal\">
               <div class=\"modal-content\">
                 <span id=\"closeBudgetModal\">&times;</span>
                 <form id=\"budgetForm\">
                   <input type=\"date\" id=\"startDate\" name=\"startDate\" required>
                   <input type=\"number\" id=\"duration\" name=\"duration\" min=\"0\" \
                   placeholder=\"Duration (days)\" required>
                   <input type=\"number\" id=\"amount\" name=\"budget\" step=\"0.01\" \
                   placeholder=\"Amount\" required>
                   <button type=\"submit\">Create</button>
                 </form>
               </div>
             </div>

             <div id=\"spendingModal\" class=\"modal\">
               <div class=\"modal-content\">
                 <span id=\"closeSpendingModal\">&times;</span>
                 <form id=\"spendingForm\">
                   <input type=\"date\" id=\"date\" name=\"date\" required>
                   <input type=\"number\" id=\"spent\" name=\"spent\" step=\"0.01\" \
                   placeholder=\"Amount spent\" required>
                   <input type=\"text\" id=\"purpose\" name=\"purpose\" placeholder=\"Purpose\" \
                   required>
                   <button type=\"submit\">Log</button>
                 </form>
               </div>
             </div>

             <script src=\"https://cdn.jsdelivr.net/npm/chart.js\"></script>
             <script src=\"/static/assets/js/dashboard.js\"></script>",
            escape(username),
        );

        layout("Dashboard", &body)
    }
}

impl StatsPage {
    pub fn generate(summary: &str, breakdown: &[PurposeTotal]) -> String {
        let mut rows = String::new();
        for item in breakdown {
            rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(&item.purpose),
                item.spent,
            ));
        }

        let body = format!(
            "<h1>Spending stats</h1>
             <table>
               <tr><th>Purpose</th><th>Spent</th></tr>
               {rows}
             </table>
             <h2>Where to cut back</h2>
             <p>{}</p>",
            escape(summary),
        );

        layout("Stats", &body)
    }
}
