use axum::{response::Html, routing::get, Router};

pub fn router() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Chat with your CSVs</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 2rem; color: #1d1d1f; }
    h1 { margin-bottom: 0.5rem; }
    .card { border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
    label { display: block; margin-top: 0.75rem; font-weight: 600; }
    input { width: 100%; padding: 0.5rem; box-sizing: border-box; }
    table { border-collapse: collapse; margin-top: 0.5rem; font-size: 0.85rem; }
    th, td { border: 1px solid #ccc; padding: 0.25rem 0.5rem; }
    .banner { padding: 0.75rem 1rem; border-radius: 6px; margin-top: 1rem; display: none; }
    .banner.info { background: #fff4ce; display: block; }
    .banner.success { background: #dff6dd; display: block; }
    .banner.error { background: #fde7e9; display: block; }
    .busy { display: none; color: #555; margin-top: 0.5rem; }
    pre { background: #f6f8fa; padding: 1rem; overflow: auto; white-space: pre-wrap; }
  </style>
</head>
<body>
  <h1>Chat with your CSVs (natural language)</h1>
  <p>Upload CSV files and ask questions in normal language.
     The AI will look inside the tables and answer using the actual data.</p>

  <div class="card">
    <h2>1) OpenAI API key</h2>
    <input id="apiKey" type="password" placeholder="sk-..." />
  </div>

  <div class="card">
    <h2>2) Upload CSV files</h2>
    <input id="fileInput" type="file" accept=".csv" multiple />
    <div id="previews"></div>
  </div>

  <div class="card">
    <h2>3) Ask a question in normal language</h2>
    <input id="question"
           placeholder="Example: 'what is the return policy', 'total sales for 2023'" />
    <div id="busy" class="busy">Reading your CSVs and answering from the data...</div>
  </div>

  <div id="banner" class="banner"></div>
  <div class="card" id="answerCard" style="display:none">
    <h2>AI Response</h2>
    <pre id="answer"></pre>
  </div>

  <script>
    let sessionId = null;
    const banner = document.getElementById('banner');
    const busy = document.getElementById('busy');
    const answerCard = document.getElementById('answerCard');

    function showBanner(kind, text) {
      banner.className = 'banner ' + kind;
      banner.textContent = text;
    }
    function clearBanner() { banner.className = 'banner'; banner.textContent = ''; }

    async function init() {
      const res = await fetch('/api/session', { method: 'POST' });
      const json = await res.json();
      sessionId = json.session_id;
    }
    init();

    document.getElementById('apiKey').addEventListener('change', async (e) => {
      clearBanner();
      await fetch(`/api/session/${sessionId}/key`, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ api_key: e.target.value })
      });
    });

    document.getElementById('fileInput').addEventListener('change', async (e) => {
      clearBanner();
      const formData = new FormData();
      for (const file of e.target.files) formData.append('files', file);
      const res = await fetch(`/api/session/${sessionId}/files`, {
        method: 'POST',
        body: formData
      });
      const json = await res.json();
      renderPreviews(json);
    });

    function renderPreviews(json) {
      const previews = document.getElementById('previews');
      previews.innerHTML = '';
      for (const table of json.loaded || []) {
        const h = document.createElement('h3');
        h.textContent = table.name;
        previews.appendChild(h);
        // Cell values come straight from user files; never render them as HTML.
        const el = document.createElement('table');
        const head = document.createElement('tr');
        for (const col of table.columns) {
          const th = document.createElement('th');
          th.textContent = col;
          head.appendChild(th);
        }
        el.appendChild(head);
        for (const row of table.rows) {
          const tr = document.createElement('tr');
          for (const cell of row) {
            const td = document.createElement('td');
            td.textContent = cell;
            tr.appendChild(td);
          }
          el.appendChild(tr);
        }
        previews.appendChild(el);
      }
      for (const failure of json.failures || []) {
        showBanner('error', `${failure.file}: ${failure.error}`);
      }
    }

    document.getElementById('question').addEventListener('keydown', async (e) => {
      if (e.key !== 'Enter') return;
      const question = e.target.value;
      clearBanner();
      answerCard.style.display = 'none';
      busy.style.display = 'block';
      try {
        const res = await fetch(`/api/session/${sessionId}/ask`, {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ question })
        });
        const json = await res.json();
        if (json.status === 'success') {
          showBanner('success', 'Analysis complete!');
          document.getElementById('answer').textContent = json.answer;
          answerCard.style.display = 'block';
        } else {
          showBanner(json.status === 'info' ? 'info' : 'error', json.message);
        }
      } finally {
        busy.style.display = 'none';
      }
    });
  </script>
</body>
</html>"##)
}
